//! Coarse content-type sniffing from a file's leading bytes.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeTag {
    Text,
    Binary,
    Unknown,
}

/// Pure: inspects only the supplied prefix, never touches the filesystem.
/// An `Unknown` answer is treated downstream as "not text", never as an
/// error.
pub trait TypeClassifier: Send + Sync {
    fn guess(&self, prefix: &[u8]) -> TypeTag;
}

/// Default classifier: magic-byte sniffing via `infer`, with a UTF-8
/// heuristic for the formats `infer` has no signature for.
#[derive(Debug, Default)]
pub struct ContentClassifier;

impl TypeClassifier for ContentClassifier {
    fn guess(&self, prefix: &[u8]) -> TypeTag {
        if prefix.is_empty() {
            return TypeTag::Unknown;
        }
        if let Some(kind) = infer::get(prefix) {
            return if kind.mime_type().starts_with("text/") {
                TypeTag::Text
            } else {
                TypeTag::Binary
            };
        }
        if looks_textual(prefix) {
            TypeTag::Text
        } else {
            TypeTag::Binary
        }
    }
}

fn looks_textual(prefix: &[u8]) -> bool {
    if prefix.contains(&0) {
        return false;
    }
    match std::str::from_utf8(prefix) {
        Ok(_) => true,
        // The prefix may clip a multi-byte sequence at its end; that alone
        // does not make the content binary.
        Err(e) => e.error_len().is_none(),
    }
}
