/*!
 * Display reconciliation.
 *
 * Two text regions sit on top of the video: the original line and its
 * translation. The reconciler compares what they show with what the active
 * cue says they should show and only touches a region when they differ.
 */

use log::debug;

use crate::subtitle_processor::Cue;
use crate::timeline::CueTimeline;

/// One of the two subtitle regions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Region {
    Original,
    Translated,
}

impl Region {
    pub const ALL: [Region; 2] = [Region::Original, Region::Translated];
}

/// The page elements holding the two subtitle regions
pub trait SubtitleSurface: Send {
    /// Whether both regions currently exist
    fn has_regions(&self) -> bool;

    /// Create the regions; `false` when there is nowhere to attach them yet
    fn create_regions(&mut self) -> bool;

    /// Remove the regions
    fn remove_regions(&mut self);

    /// Text currently shown in `region`
    fn text(&self, region: Region) -> String;

    /// Replace the text of `region`
    fn set_text(&mut self, region: Region, text: &str);

    fn is_visible(&self, region: Region) -> bool;

    fn set_visible(&mut self, region: Region, visible: bool);
}

/// What a render call did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOutcome {
    /// No valid time or session, nothing touched
    Skipped,
    /// Regions could not be created yet
    NoSurface,
    /// No active cue, regions cleared
    Cleared,
    /// Active cue rendered
    Shown,
}

/// Keeps the subtitle regions in sync with the active cue
pub struct DisplayReconciler<S: SubtitleSurface> {
    surface: S,
    ui_language: String,
}

impl<S: SubtitleSurface> DisplayReconciler<S> {
    pub fn new(surface: S, ui_language: impl Into<String>) -> Self {
        Self {
            surface,
            ui_language: ui_language.into(),
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn set_ui_language(&mut self, ui_language: impl Into<String>) {
        self.ui_language = ui_language.into();
    }

    /// Show the cue active at `time` for `session_id`, or clear the regions
    pub fn render(&mut self, time: Option<f64>, session_id: Option<&str>, timeline: &CueTimeline) -> RenderOutcome {
        let (Some(time), Some(session_id)) = (time.filter(|t| t.is_finite()), session_id) else {
            return RenderOutcome::Skipped;
        };

        if !self.ensure_regions() {
            return RenderOutcome::NoSurface;
        }

        match timeline.active_cue_at(time, session_id) {
            Some(cue) => {
                self.show(cue);
                RenderOutcome::Shown
            }
            None => {
                self.clear();
                RenderOutcome::Cleared
            }
        }
    }

    /// Empty and hide both regions
    pub fn clear(&mut self) {
        if !self.surface.has_regions() {
            return;
        }
        for region in Region::ALL {
            self.update_region(region, "");
        }
    }

    /// Remove the regions; the next render creates them again
    pub fn teardown(&mut self) {
        if self.surface.has_regions() {
            self.surface.remove_regions();
        }
    }

    fn ensure_regions(&mut self) -> bool {
        if self.surface.has_regions() {
            return true;
        }
        let created = self.surface.create_regions();
        if created {
            debug!("Subtitle regions created");
        }
        created
    }

    fn show(&mut self, cue: &Cue) {
        let original = escape_text(&cue.original);
        let translated = cue.display_translation(&self.ui_language)
            .map(|text| escape_text(&text))
            .unwrap_or_default();

        self.update_region(Region::Original, &original);
        self.update_region(Region::Translated, &translated);
    }

    fn update_region(&mut self, region: Region, value: &str) {
        if self.surface.text(region) != value {
            self.surface.set_text(region, value);
        }

        let visible = !value.trim().is_empty();
        if self.surface.is_visible(region) != visible {
            self.surface.set_visible(region, visible);
        }
    }
}

/// Escape `&`, `<` and `>` for display
pub fn escape_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// In-memory surface that records every mutation
#[derive(Debug, Default, Clone)]
pub struct MemorySurface {
    regions: Option<[(String, bool); 2]>,
    attachable: bool,
    writes: usize,
}

impl MemorySurface {
    /// Surface that can create its regions right away
    pub fn new() -> Self {
        Self {
            regions: None,
            attachable: true,
            writes: 0,
        }
    }

    /// Surface whose host does not exist yet
    pub fn detached() -> Self {
        Self {
            attachable: false,
            ..Self::new()
        }
    }

    /// Let the surface create its regions from now on
    pub fn attach(&mut self) {
        self.attachable = true;
    }

    /// Number of text and visibility writes so far
    pub fn writes(&self) -> usize {
        self.writes
    }

    fn slot(region: Region) -> usize {
        match region {
            Region::Original => 0,
            Region::Translated => 1,
        }
    }
}

impl SubtitleSurface for MemorySurface {
    fn has_regions(&self) -> bool {
        self.regions.is_some()
    }

    fn create_regions(&mut self) -> bool {
        if !self.attachable {
            return false;
        }
        self.regions = Some(Default::default());
        true
    }

    fn remove_regions(&mut self) {
        self.regions = None;
    }

    fn text(&self, region: Region) -> String {
        self.regions.as_ref()
            .map(|regions| regions[Self::slot(region)].0.clone())
            .unwrap_or_default()
    }

    fn set_text(&mut self, region: Region, text: &str) {
        if let Some(regions) = self.regions.as_mut() {
            regions[Self::slot(region)].0 = text.to_string();
            self.writes += 1;
        }
    }

    fn is_visible(&self, region: Region) -> bool {
        self.regions.as_ref()
            .is_some_and(|regions| regions[Self::slot(region)].1)
    }

    fn set_visible(&mut self, region: Region, visible: bool) {
        if let Some(regions) = self.regions.as_mut() {
            regions[Self::slot(region)].1 = visible;
            self.writes += 1;
        }
    }
}
