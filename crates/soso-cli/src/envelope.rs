use serde::Serialize;

pub(crate) const SCHEMA_VERSION: u64 = 1;

pub(crate) fn warning_hint(code: &'static str) -> Option<&'static str> {
    match code {
        "stopwords_unavailable" => Some(
            "The stopword file could not be read, so every non-blank token was ranked. Check --stopwords / SOSO_STOPWORDS_PATH.",
        ),
        "stopwords_not_configured" => Some(
            "No stopword file was configured, so every non-blank token was ranked. Pass --stopwords or set SOSO_STOPWORDS_PATH.",
        ),
        "density_fallback_whole_document" => Some(
            "No block of lines was dense enough to look like an article, so the whole page text was kept (navigation and footers included).",
        ),
        _ => None,
    }
}

pub(crate) fn warning_hints_from(codes: &[&'static str]) -> serde_json::Value {
    let mut m = serde_json::Map::new();
    for c in codes {
        if let Some(h) = warning_hint(c) {
            m.insert((*c).to_string(), serde_json::json!(h));
        }
    }
    serde_json::Value::Object(m)
}

#[derive(Clone, Copy, Debug)]
pub(crate) enum ErrorCode {
    NotConfigured,
    DictionaryFailed,
    StopwordsFailed,
    InputFailed,
}

impl ErrorCode {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::NotConfigured => "not_configured",
            Self::DictionaryFailed => "dictionary_failed",
            Self::StopwordsFailed => "stopwords_failed",
            Self::InputFailed => "input_failed",
        }
    }

    pub(crate) fn from_error(e: &soso_core::Error) -> Self {
        match e {
            soso_core::Error::NotConfigured(_) => Self::NotConfigured,
            soso_core::Error::Dictionary(_) => Self::DictionaryFailed,
            soso_core::Error::Stopwords(_) => Self::StopwordsFailed,
            soso_core::Error::Io(_) => Self::InputFailed,
        }
    }

    pub(crate) fn hint(self) -> &'static str {
        match self {
            Self::NotConfigured => "Pass --dictionary or set SOSO_DICTIONARY_PATH.",
            Self::DictionaryFailed => {
                "The dictionary must exist and contain at least one `term [frequency]` line."
            }
            Self::StopwordsFailed => "Check that the stopword file exists and is readable.",
            Self::InputFailed => "Check that the input file exists and is readable.",
        }
    }
}

pub(crate) fn add_envelope_fields(payload: &mut serde_json::Value, kind: &str, elapsed_ms: u128) {
    payload["schema_version"] = serde_json::json!(SCHEMA_VERSION);
    payload["kind"] = serde_json::json!(kind);
    payload["elapsed_ms"] = serde_json::json!(elapsed_ms);
}

pub(crate) fn error_obj(code: ErrorCode, message: impl ToString) -> serde_json::Value {
    #[derive(Serialize)]
    struct ErrorObject {
        code: &'static str,
        message: String,
        hint: &'static str,
    }

    let e = ErrorObject {
        code: code.as_str(),
        message: message.to_string(),
        hint: code.hint(),
    };
    match serde_json::to_value(e) {
        Ok(v) => v,
        Err(_) => serde_json::json!({
            "code": code.as_str(),
            "message": message.to_string(),
            "hint": code.hint(),
        }),
    }
}
