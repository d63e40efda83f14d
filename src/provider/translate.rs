//! Translation eligibility and replacement text generation.

use crate::provider::{AnalysisData, InvocationRecord, Macro};

/// An ordered macro -> optional-translation mapping.
///
/// Entry order follows definition order in the results file, and the patch
/// engine applies edits in exactly this order. An absent translation is the
/// explicit "leave this macro's source untouched" marker.
#[derive(Debug, Clone, Default)]
pub struct TranslationMap {
    entries: Vec<TranslationEntry>,
}

#[derive(Debug, Clone)]
pub struct TranslationEntry {
    pub macro_def: Macro,
    pub translation: Option<String>,
}

impl TranslationMap {
    pub fn push(&mut self, macro_def: Macro, translation: Option<String>) {
        self.entries.push(TranslationEntry {
            macro_def,
            translation,
        });
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TranslationEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a TranslationMap {
    type Item = &'a TranslationEntry;
    type IntoIter = std::slice::Iter<'a, TranslationEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Build the macro -> translation mapping for every macro the analysis saw.
///
/// A macro qualifies for translation when replacing its definition with a C
/// declaration cannot change the program's interface:
///
/// - the analysis recorded at least one invocation (an uninvoked macro has
///   no type signature to build a declaration from),
/// - the preprocessor never inspected its name (a macro tested by `#ifdef`
///   must stay a macro),
/// - every invocation is a complete top-level construct outside macro
///   arguments,
/// - the representative invocation carries a usable type signature.
///
/// Macros that fail a check stay in the map with an absent translation.
pub fn interface_equivalent_translations(data: &AnalysisData) -> TranslationMap {
    let mut map = TranslationMap::default();
    for (mac, invocations) in data.macros() {
        map.push(mac.clone(), translation_for(mac, invocations, data));
    }
    map
}

fn translation_for(
    mac: &Macro,
    invocations: &[InvocationRecord],
    data: &AnalysisData,
) -> Option<String> {
    // All invocations of a qualifying macro share one signature, so the
    // first is as good as any.
    let representative = invocations.first()?;

    if data.is_inspected(&mac.name) {
        return None;
    }
    if !invocations.iter().all(|inv| inv.is_top_level_non_argument) {
        return None;
    }

    let signature = representative.type_signature.trim();
    if signature.is_empty() {
        return None;
    }

    if mac.is_function_like() {
        Some(format!("{signature} {{ return {body} }};", body = mac.body))
    } else {
        Some(format!("{signature} = {body};", body = mac.body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::load_from_str;

    fn definition(name: &str, object_like: bool, body: &str, line: usize) -> String {
        format!(
            r#"{{"Kind": "Definition", "Name": "{name}", "IsObjectLike": {object_like},
                "IsDefinitionLocationValid": true, "Body": "{body}",
                "DefinitionLocation": "/src/m.c:{line}:9",
                "EndDefinitionLocation": "/src/m.c:{line}:30"}}"#
        )
    }

    fn invocation(name: &str, line: usize, signature: &str, top_level: bool) -> String {
        format!(
            r#"{{"Kind": "Invocation", "Name": "{name}",
                "DefinitionLocation": "/src/m.c:{line}:9",
                "IsDefinitionLocationValid": true,
                "InvocationLocation": "/src/m.c:{inv}:1",
                "TypeSignature": "{signature}",
                "IsTopLevelNonArgument": {top_level}}}"#,
            inv = line + 100
        )
    }

    fn translations_for(entries: &[String]) -> TranslationMap {
        let json = format!("[{}]", entries.join(","));
        let data = load_from_str(&json).unwrap();
        interface_equivalent_translations(&data)
    }

    #[test]
    fn test_object_like_macro_becomes_initialized_declaration() {
        let map = translations_for(&[
            definition("BUFSZ", true, "4096", 3),
            invocation("BUFSZ", 3, "const int BUFSZ", true),
        ]);
        assert_eq!(map.len(), 1);
        assert_eq!(
            map.iter().next().unwrap().translation.as_deref(),
            Some("const int BUFSZ = 4096;")
        );
    }

    #[test]
    fn test_function_like_macro_becomes_function_definition() {
        let map = translations_for(&[
            definition("NEGATE", false, "(-(x))", 5),
            invocation("NEGATE", 5, "int NEGATE(int x)", true),
        ]);
        assert_eq!(
            map.iter().next().unwrap().translation.as_deref(),
            Some("int NEGATE(int x) { return (-(x)) };")
        );
    }

    #[test]
    fn test_uninvoked_macro_has_no_translation() {
        let map = translations_for(&[definition("UNUSED", true, "1", 2)]);
        assert_eq!(map.len(), 1);
        assert!(map.iter().next().unwrap().translation.is_none());
    }

    #[test]
    fn test_inspected_macro_has_no_translation() {
        let map = translations_for(&[
            definition("DEBUG", true, "1", 2),
            invocation("DEBUG", 2, "const int DEBUG", true),
            r#"{"Kind": "InspectedByCPP", "Name": "DEBUG"}"#.to_string(),
        ]);
        assert!(map.iter().next().unwrap().translation.is_none());
    }

    #[test]
    fn test_nested_invocation_blocks_translation() {
        let map = translations_for(&[
            definition("WRAP", false, "f(x)", 4),
            invocation("WRAP", 4, "int WRAP(int x)", false),
        ]);
        assert!(map.iter().next().unwrap().translation.is_none());
    }

    #[test]
    fn test_missing_type_signature_blocks_translation() {
        let map = translations_for(&[
            definition("RAW", true, "goto out", 6),
            invocation("RAW", 6, "", true),
        ]);
        assert!(map.iter().next().unwrap().translation.is_none());
    }

    #[test]
    fn test_map_preserves_definition_order() {
        let map = translations_for(&[
            definition("FIRST", true, "1", 2),
            definition("SECOND", true, "2", 4),
            invocation("SECOND", 4, "int SECOND", true),
            invocation("FIRST", 2, "int FIRST", true),
        ]);
        let names: Vec<_> = map.iter().map(|e| e.macro_def.name.as_str()).collect();
        assert_eq!(names, ["FIRST", "SECOND"]);
    }
}
