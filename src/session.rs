//! Conversation state owned by the caller: the current analyzer, where the
//! birth place resolved to, and the ordered chat log.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::analyzer::{BirthProfile, ChartAnalyzer};
use crate::ephemeris::Ephemeris;
use crate::error::SessionError;
use crate::geocode::{GeoLocation, Geocoder};

pub const ANALYZED_MESSAGE: &str = "Kundli has been analyzed. You can now ask questions about it!";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Speaker {
    System,
    User,
    Bot,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub speaker: Speaker,
    pub text: String,
}

impl fmt::Display for Turn {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.speaker {
            Speaker::User => write!(f, "👤 You: {}", self.text),
            Speaker::System | Speaker::Bot => write!(f, "🤖 Bot: {}", self.text),
        }
    }
}

/// Raw birth form fields as typed by the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub name: String,
    pub date: String,
    pub time: String,
    pub place: String,
}

#[derive(Debug, Default)]
pub struct Session {
    analyzer: Option<ChartAnalyzer>,
    location: Option<GeoLocation>,
    history: Vec<Turn>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Geocodes the place, then builds the chart. On any failure the session
    /// keeps its previous analyzer and log.
    pub fn analyze(
        &mut self,
        request: &AnalysisRequest,
        geocoder: &dyn Geocoder,
        ephemeris: &dyn Ephemeris,
    ) -> Result<&ChartAnalyzer, SessionError> {
        let location = geocoder.geocode(&request.place).map_err(|e| {
            log::warn!("geocoding {:?} failed: {e}", request.place);
            SessionError::from(e)
        })?;

        let profile =
            BirthProfile::parse(&request.name, &request.date, &request.time, &request.place)?;
        let analyzer = ChartAnalyzer::new(profile, ephemeris).map_err(|e| {
            log::warn!("chart construction for {:?} failed: {e}", request.name);
            SessionError::from(e)
        })?;

        self.location = Some(location);
        self.push(Speaker::System, ANALYZED_MESSAGE);
        Ok(self.analyzer.insert(analyzer))
    }

    /// Answers a question against the current chart and logs both sides.
    pub fn ask(&mut self, question: &str) -> Result<String, SessionError> {
        if question.trim().is_empty() {
            return Err(SessionError::EmptyQuestion);
        }
        let analyzer = self.analyzer.as_ref().ok_or(SessionError::NotAnalyzed)?;
        let reply = analyzer.respond(question);

        self.push(Speaker::User, question);
        self.push(Speaker::Bot, &reply);
        Ok(reply)
    }

    pub fn analyzer(&self) -> Option<&ChartAnalyzer> {
        self.analyzer.as_ref()
    }

    /// Where the birth place resolved to. Display data only.
    pub fn location(&self) -> Option<&GeoLocation> {
        self.location.as_ref()
    }

    pub fn history(&self) -> &[Turn] {
        &self.history
    }

    fn push(&mut self, speaker: Speaker, text: &str) {
        self.history.push(Turn {
            speaker,
            text: text.to_string(),
        });
    }
}
