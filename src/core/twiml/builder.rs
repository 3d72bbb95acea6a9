//! Chainable builder for TwiML `<Response>` documents.

/// Seconds of speech silence after which Twilio considers an utterance done.
/// "auto" lets Twilio pick based on detected speech patterns.
const SPEECH_TIMEOUT: &str = "auto";

#[derive(Debug, Clone)]
enum Verb {
    Say(String),
    Pause(u32),
    Gather { action: String },
    Redirect(String),
    Hangup,
}

/// Builder for a TwiML voice response.
///
/// Verbs render in the order they are added. `build` produces the complete
/// XML document, escaping all text content.
///
/// # Example
///
/// ```
/// use callbridge::core::twiml::VoiceResponse;
///
/// let twiml = VoiceResponse::new()
///     .say("Hello")
///     .gather_speech("/gather")
///     .redirect("/twilio-voice")
///     .build();
/// assert!(twiml.contains("<Say>Hello</Say>"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct VoiceResponse {
    verbs: Vec<Verb>,
}

impl VoiceResponse {
    pub fn new() -> Self {
        Self::default()
    }

    /// Speak `text` to the caller.
    pub fn say(mut self, text: &str) -> Self {
        self.verbs.push(Verb::Say(text.to_string()));
        self
    }

    /// Wait silently for `length` seconds.
    pub fn pause(mut self, length: u32) -> Self {
        self.verbs.push(Verb::Pause(length));
        self
    }

    /// Listen for speech and POST the recognition result to `action`.
    ///
    /// If the caller says nothing before the gather times out, Twilio falls
    /// through to the verbs that follow this one.
    pub fn gather_speech(mut self, action: &str) -> Self {
        self.verbs.push(Verb::Gather {
            action: action.to_string(),
        });
        self
    }

    /// Continue call handling at `url`.
    pub fn redirect(mut self, url: &str) -> Self {
        self.verbs.push(Verb::Redirect(url.to_string()));
        self
    }

    /// End the call.
    pub fn hangup(mut self) -> Self {
        self.verbs.push(Verb::Hangup);
        self
    }

    /// Render the full TwiML document.
    pub fn build(&self) -> String {
        let mut xml = String::with_capacity(256);
        xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>");
        xml.push_str("<Response>");
        for verb in &self.verbs {
            match verb {
                Verb::Say(text) => {
                    xml.push_str("<Say>");
                    xml.push_str(&xml_escape(text));
                    xml.push_str("</Say>");
                }
                Verb::Pause(length) => {
                    xml.push_str(&format!("<Pause length=\"{length}\"/>"));
                }
                Verb::Gather { action } => {
                    xml.push_str(&format!(
                        "<Gather input=\"speech\" action=\"{}\" speechTimeout=\"{SPEECH_TIMEOUT}\"/>",
                        xml_escape(action)
                    ));
                }
                Verb::Redirect(url) => {
                    xml.push_str("<Redirect>");
                    xml.push_str(&xml_escape(url));
                    xml.push_str("</Redirect>");
                }
                Verb::Hangup => xml.push_str("<Hangup/>"),
            }
        }
        xml.push_str("</Response>");
        xml
    }
}

/// Escape text for inclusion in XML content or attribute values.
fn xml_escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
