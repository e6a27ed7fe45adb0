/*!
 * Localized placeholder texts for failed translations.
 *
 * A failed cue shows one of these strings in the translated region instead
 * of staying blank forever.
 */

use crate::language_utils;
use crate::subtitle_processor::TranslationFailure;

/// English texts, also the fallback for every other language
const ENGLISH: [&str; 3] = [
    "[Translation failed]",
    "[Translation service unreachable]",
    "[Translation provider error]",
];

/// Localized texts indexed like `ENGLISH`
const LOCALIZED: &[(&str, [&str; 3])] = &[
    ("es", ["[Error de traducción]", "[Servicio de traducción no disponible]", "[Error del proveedor de traducción]"]),
    ("fr", ["[Échec de la traduction]", "[Service de traduction injoignable]", "[Erreur du fournisseur de traduction]"]),
    ("de", ["[Übersetzung fehlgeschlagen]", "[Übersetzungsdienst nicht erreichbar]", "[Fehler des Übersetzungsanbieters]"]),
    ("it", ["[Traduzione non riuscita]", "[Servizio di traduzione non raggiungibile]", "[Errore del fornitore di traduzione]"]),
    ("pt", ["[Falha na tradução]", "[Serviço de tradução indisponível]", "[Erro do provedor de tradução]"]),
    ("ja", ["[翻訳に失敗しました]", "[翻訳サービスに接続できません]", "[翻訳プロバイダーのエラー]"]),
    ("ko", ["[번역 실패]", "[번역 서비스에 연결할 수 없음]", "[번역 제공자 오류]"]),
    ("zh", ["[翻译失败]", "[无法连接翻译服务]", "[翻译服务提供商错误]"]),
];

fn index(kind: TranslationFailure) -> usize {
    match kind {
        TranslationFailure::Generic => 0,
        TranslationFailure::RequestTransport => 1,
        TranslationFailure::ProviderError => 2,
    }
}

/// Placeholder text for `kind` in `ui_language`
pub fn failure_message(kind: TranslationFailure, ui_language: &str) -> &'static str {
    let code = language_utils::normalize_to_part1_or_part2t(ui_language)
        .unwrap_or_else(|_| language_utils::primary_subtag(ui_language).to_lowercase());

    LOCALIZED.iter()
        .find(|(lang, _)| *lang == code)
        .map(|(_, texts)| texts[index(kind)])
        .unwrap_or(ENGLISH[index(kind)])
}

/// Placeholder text for a wire category name.
///
/// Unrecognized categories get the English generic text.
pub fn failure_message_for_category(category: &str, ui_language: &str) -> &'static str {
    match TranslationFailure::from_category(category) {
        Some(kind) => failure_message(kind, ui_language),
        None => ENGLISH[index(TranslationFailure::Generic)],
    }
}
