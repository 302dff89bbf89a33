//! Story records and the selections a user makes before drafting.

use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

/// Number of panels drafted when the user does not choose one.
pub const DEFAULT_PANEL_COUNT: u32 = 6;

/// Art direction applied to every generated illustration.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    derive_more::Display,
    strum::EnumIter,
)]
#[serde(from = "String", into = "String")]
pub enum VisualStyle {
    /// Film-still lighting and composition
    #[default]
    #[display("Cinematic")]
    Cinematic,
    /// Soft washes and paper texture
    #[display("Watercolor")]
    Watercolor,
    /// Japanese animation look
    #[display("Anime")]
    Anime,
    /// Inked lines and flat colors
    #[display("Comic Book")]
    ComicBook,
    /// Photographic realism
    #[display("Photorealistic")]
    Photorealistic,
    /// Low-resolution retro game art
    #[display("Pixel Art")]
    PixelArt,
}

/// How text and illustration share a page.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    derive_more::Display,
    strum::EnumIter,
)]
#[serde(from = "String", into = "String")]
pub enum LayoutChoice {
    /// Illustration fills the page, caption overlaid
    #[default]
    #[display("Full Page")]
    FullPage,
    /// Illustration above, caption block below
    #[display("Split Text")]
    SplitText,
    /// Several panels per page in a strip
    #[display("Comic Strip")]
    ComicStrip,
}

/// Who the book is written for.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    derive_more::Display,
    strum::EnumIter,
)]
#[serde(from = "String", into = "String")]
pub enum TargetAudience {
    /// All ages
    #[default]
    #[display("General")]
    General,
    /// Picture-book readers
    #[display("Children")]
    Children,
    /// Teen readers
    #[display("Young Adult")]
    YoungAdult,
    /// Mature readers
    #[display("Adult")]
    Adult,
}

/// Case- and separator-insensitive match against the display names of `E`.
///
/// Values the service or the user invent fall back to `E::default()`.
fn parse_lenient<E>(raw: &str) -> E
where
    E: IntoEnumIterator + std::fmt::Display + Default,
{
    let wanted = normalize(raw);
    E::iter()
        .find(|candidate| normalize(&candidate.to_string()) == wanted)
        .unwrap_or_default()
}

fn normalize(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

macro_rules! lenient_string_enum {
    ($($ty:ty),*) => {$(
        impl From<String> for $ty {
            fn from(raw: String) -> Self {
                parse_lenient(&raw)
            }
        }

        impl From<$ty> for String {
            fn from(value: $ty) -> Self {
                value.to_string()
            }
        }

        impl std::str::FromStr for $ty {
            type Err = std::convert::Infallible;

            fn from_str(raw: &str) -> Result<Self, Self::Err> {
                Ok(parse_lenient(raw))
            }
        }
    )*};
}

lenient_string_enum!(VisualStyle, LayoutChoice, TargetAudience);

/// A story idea, found by search or authored by the user.
///
/// # Examples
///
/// ```
/// use storyforge_core::{Story, TargetAudience, VisualStyle};
///
/// let story = Story::new("The Lighthouse", "A keeper finds a message.", "User Prompt")
///     .with_selections(VisualStyle::Watercolor, TargetAudience::Children);
///
/// assert_eq!(story.visual_style, VisualStyle::Watercolor);
/// assert_eq!(story.audience, TargetAudience::Children);
/// assert_eq!(story.panel_count, 6);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Story {
    /// Unique identifier
    pub id: String,
    /// Story title
    pub title: String,
    /// One-paragraph summary
    pub summary: String,
    /// Where the idea came from (a site name, "User Prompt", ...)
    pub source: String,
    /// Desired number of panels in the script
    pub panel_count: u32,
    /// Art direction for illustrations
    pub visual_style: VisualStyle,
    /// Page layout
    pub layout: LayoutChoice,
    /// Intended readership
    pub audience: TargetAudience,
}

impl Story {
    /// Create a story with a fresh id and default selections.
    pub fn new(
        title: impl Into<String>,
        summary: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title: title.into(),
            summary: summary.into(),
            source: source.into(),
            panel_count: DEFAULT_PANEL_COUNT,
            visual_style: VisualStyle::default(),
            layout: LayoutChoice::default(),
            audience: TargetAudience::default(),
        }
    }

    /// Copy the user's style and audience selections onto the story.
    pub fn with_selections(mut self, style: VisualStyle, audience: TargetAudience) -> Self {
        self.visual_style = style;
        self.audience = audience;
        self
    }

    /// Set the page layout.
    pub fn with_layout(mut self, layout: LayoutChoice) -> Self {
        self.layout = layout;
        self
    }

    /// Set the desired panel count (at least one).
    pub fn with_panel_count(mut self, count: u32) -> Self {
        self.panel_count = count.max(1);
        self
    }

    /// Number of panels to ask for when drafting a script.
    ///
    /// Stories deserialized from disk may carry a zero count; a script
    /// always has at least one panel.
    pub fn requested_panels(&self) -> u32 {
        self.panel_count.max(1)
    }
}
