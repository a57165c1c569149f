use serde::Serialize;

/// Speakers the backend ships reference audio for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Speaker {
    ChineseFemale,
    ChineseMale,
    EnglishFemale,
    EnglishMale,
    SpanishFemale,
    FrenchFemale,
}

/// Outcome of looking a label up in the speaker table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeakerResolution {
    Resolved(Speaker),
    Unresolved,
}

impl Speaker {
    pub const ALL: [Speaker; 6] = [
        Speaker::ChineseFemale,
        Speaker::ChineseMale,
        Speaker::EnglishFemale,
        Speaker::EnglishMale,
        Speaker::SpanishFemale,
        Speaker::FrenchFemale,
    ];

    /// Label shown to the user.
    pub fn desc(self) -> &'static str {
        match self {
            Speaker::ChineseFemale => "中文女声（默认）",
            Speaker::ChineseMale => "中文男声",
            Speaker::EnglishFemale => "英文女声",
            Speaker::EnglishMale => "英文男声",
            Speaker::SpanishFemale => "西班牙语女声",
            Speaker::FrenchFemale => "法语女声",
        }
    }

    /// Id the backend expects in `speaker`.
    pub fn id(self) -> &'static str {
        match self {
            Speaker::ChineseFemale => "zh_cn_0",
            Speaker::ChineseMale => "zh_cn_1",
            Speaker::EnglishFemale => "en_0",
            Speaker::EnglishMale => "en_1",
            Speaker::SpanishFemale => "es_0",
            Speaker::FrenchFemale => "fr_0",
        }
    }

    pub fn resolve(label: &str) -> SpeakerResolution {
        let label = label.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|s| s.desc() == label)
            .map_or(SpeakerResolution::Unresolved, SpeakerResolution::Resolved)
    }

    pub fn from_id(id: &str) -> SpeakerResolution {
        let id = id.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|s| s.id() == id)
            .map_or(SpeakerResolution::Unresolved, SpeakerResolution::Resolved)
    }

    pub fn descriptor(self) -> SpeakerDescriptor {
        SpeakerDescriptor {
            desc: self.desc().to_string(),
            name: self.id().to_string(),
        }
    }
}

impl SpeakerResolution {
    pub fn speaker(self) -> Option<Speaker> {
        match self {
            SpeakerResolution::Resolved(s) => Some(s),
            SpeakerResolution::Unresolved => None,
        }
    }

    /// Tries `other` when this lookup came up empty.
    pub fn or_else(self, other: impl FnOnce() -> SpeakerResolution) -> SpeakerResolution {
        match self {
            SpeakerResolution::Resolved(_) => self,
            SpeakerResolution::Unresolved => other(),
        }
    }
}

/// A selectable speaker: localized label plus internal id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpeakerDescriptor {
    pub desc: String,
    pub name: String,
}
