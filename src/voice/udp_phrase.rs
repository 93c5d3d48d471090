use crate::types::{PhraseKind, RecognizedPhrase};

/// Parse one phrase event from the external recognizer.
///
/// JSON: `{"text":"computer hide window","confidence":0.8,"kind":"recognized"}`
///
/// k=v: `conf=0.8 kind=hypothesized text=computer hide window`, where `text=`
/// takes the rest of the line.
pub fn parse_phrase_message(msg: &str) -> Option<RecognizedPhrase> {
    let msg = msg.trim();
    if msg.is_empty() {
        return None;
    }

    if msg.starts_with('{') {
        return serde_json::from_str::<RecognizedPhrase>(msg)
            .ok()
            .filter(|p| p.confidence.is_finite());
    }

    let mut confidence: Option<f32> = None;
    let mut kind = PhraseKind::Recognized;
    let mut rest = msg;

    loop {
        rest = rest.trim_start();
        if let Some(text) = rest.strip_prefix("text=") {
            let text = text.trim();
            if text.is_empty() {
                return None;
            }
            return Some(RecognizedPhrase {
                text: text.to_string(),
                confidence: confidence.filter(|c| c.is_finite())?,
                kind,
            });
        }

        let (tok, tail) = rest.split_once(char::is_whitespace)?;
        let (k, v) = tok.split_once('=')?;
        match k {
            "conf" | "confidence" => confidence = v.parse().ok(),
            "kind" => {
                kind = match v {
                    "recognized" => PhraseKind::Recognized,
                    "hypothesized" => PhraseKind::Hypothesized,
                    "rejected" => PhraseKind::Rejected,
                    _ => return None,
                }
            }
            _ => {}
        }
        rest = tail;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_json_phrase() {
        let p = parse_phrase_message(r#"{"text":"computer show window","confidence":0.91}"#)
            .expect("parse");
        assert_eq!(p.text, "computer show window");
        assert!((p.confidence - 0.91).abs() < 1e-6);
        assert_eq!(p.kind, PhraseKind::Recognized);

        let p = parse_phrase_message(r#"{"text":"computer","confidence":0.2,"kind":"rejected"}"#)
            .expect("parse");
        assert_eq!(p.kind, PhraseKind::Rejected);
    }

    #[test]
    fn parse_kv_phrase() {
        let p = parse_phrase_message("conf=0.75 text=computer hide circles  ").expect("parse");
        assert_eq!(p.text, "computer hide circles");
        assert!((p.confidence - 0.75).abs() < 1e-6);

        let p = parse_phrase_message("kind=hypothesized conf=0.4 text=computer hide").expect("parse");
        assert_eq!(p.kind, PhraseKind::Hypothesized);
        assert_eq!(p.text, "computer hide");
    }

    #[test]
    fn rejects_incomplete_phrases() {
        assert!(parse_phrase_message("").is_none());
        assert!(parse_phrase_message("text=computer show window").is_none());
        assert!(parse_phrase_message("conf=0.9").is_none());
        assert!(parse_phrase_message("conf=0.9 text=").is_none());
        assert!(parse_phrase_message("kind=shouted conf=0.9 text=hi").is_none());
    }
}
