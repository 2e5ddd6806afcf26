use smallvec::SmallVec;

use crate::foundation::core::Rgba8;
use crate::foundation::error::{PopError, PopResult};

/// Maximum label length, counted in characters.
pub const MAX_TEXT_CHARS: usize = 20;
/// Maximum number of gradient stops.
pub const MAX_GRADIENT_STOPS: usize = 8;

/// Frame variant, carried on the wire as its number `1..=10`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum FrameType {
    /// Label bar below with an upward notch.
    BottomNotch,
    /// Speech bubble below, arrow pointing up at the marker.
    BottomBubble,
    /// Label bar above with a downward notch.
    TopNotch,
    /// Speech bubble above, arrow pointing down at the marker.
    TopBubble,
    /// Flat label bar below.
    BottomFlat,
    /// Flat label bar above.
    TopFlat,
    /// Corner brackets with a hand-drawn label and curved arrow above.
    Brackets,
    /// Side label on the right with rotated text and a left-pointing notch.
    SideLabel,
    /// Corner brackets with a bubble label above.
    BracketsBubble,
    /// No frame, no text: the sticker is the marker.
    Plain,
}

/// Where a frame type places its label relative to the marker.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LabelPlacement {
    /// Under the marker area.
    Below,
    /// Over the marker area; the marker origin shifts down by the label height.
    Above,
    /// To the right, vertically centred.
    Right,
    /// No label at all.
    Hidden,
}

impl FrameType {
    /// All variants in wire order.
    pub const ALL: [FrameType; 10] = [
        Self::BottomNotch,
        Self::BottomBubble,
        Self::TopNotch,
        Self::TopBubble,
        Self::BottomFlat,
        Self::TopFlat,
        Self::Brackets,
        Self::SideLabel,
        Self::BracketsBubble,
        Self::Plain,
    ];

    /// Wire number of this variant.
    pub fn number(self) -> u8 {
        match self {
            Self::BottomNotch => 1,
            Self::BottomBubble => 2,
            Self::TopNotch => 3,
            Self::TopBubble => 4,
            Self::BottomFlat => 5,
            Self::TopFlat => 6,
            Self::Brackets => 7,
            Self::SideLabel => 8,
            Self::BracketsBubble => 9,
            Self::Plain => 10,
        }
    }

    /// Label position for this variant.
    pub fn label_placement(self) -> LabelPlacement {
        match self {
            Self::BottomNotch | Self::BottomBubble | Self::BottomFlat => LabelPlacement::Below,
            Self::TopNotch
            | Self::TopBubble
            | Self::TopFlat
            | Self::Brackets
            | Self::BracketsBubble => LabelPlacement::Above,
            Self::SideLabel => LabelPlacement::Right,
            Self::Plain => LabelPlacement::Hidden,
        }
    }

    /// Bracket variants draw corner brackets instead of a closed border.
    pub fn uses_brackets(self) -> bool {
        matches!(self, Self::Brackets | Self::BracketsBubble)
    }
}

impl TryFrom<u8> for FrameType {
    type Error = String;

    fn try_from(v: u8) -> Result<Self, Self::Error> {
        match v {
            1..=10 => Ok(Self::ALL[usize::from(v - 1)]),
            _ => Err(format!("frameType must be in 1..=10, got {v}")),
        }
    }
}

impl From<FrameType> for u8 {
    fn from(v: FrameType) -> Self {
        v.number()
    }
}

/// Text fill: exactly one of a flat colour or a left-to-right gradient.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TextFill {
    /// Flat colour.
    Solid(Rgba8),
    /// Multi-stop gradient spanning the full sticker width.
    Gradient(SmallVec<[Rgba8; 4]>),
}

/// Label typography and fill.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "TextStyleRepr", into = "TextStyleRepr")]
pub struct TextStyle {
    /// Bold weight.
    pub bold: bool,
    /// Italic style.
    pub italic: bool,
    /// Active fill.
    pub fill: TextFill,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            bold: true,
            italic: false,
            fill: TextFill::Solid(Rgba8::WHITE),
        }
    }
}

#[derive(serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct TextStyleRepr {
    #[serde(default)]
    bold: bool,
    #[serde(default)]
    italic: bool,
    #[serde(default)]
    color: Option<String>,
    #[serde(default)]
    gradient: Option<Vec<String>>,
}

impl TryFrom<TextStyleRepr> for TextStyle {
    type Error = String;

    fn try_from(r: TextStyleRepr) -> Result<Self, Self::Error> {
        let fill = match (r.color, r.gradient) {
            (Some(_), Some(_)) => {
                return Err("textStyle may set color or gradient, not both".to_owned());
            }
            (Some(c), None) => TextFill::Solid(Rgba8::parse_hex(&c)?),
            (None, Some(stops)) => TextFill::Gradient(parse_gradient(&stops)?),
            (None, None) => TextFill::Solid(Rgba8::WHITE),
        };
        Ok(Self {
            bold: r.bold,
            italic: r.italic,
            fill,
        })
    }
}

impl From<TextStyle> for TextStyleRepr {
    fn from(s: TextStyle) -> Self {
        let (color, gradient) = match s.fill {
            TextFill::Solid(c) => (Some(c.to_hex()), None),
            TextFill::Gradient(stops) => (None, Some(stops.iter().map(|c| c.to_hex()).collect())),
        };
        Self {
            bold: s.bold,
            italic: s.italic,
            color,
            gradient,
        }
    }
}

fn parse_gradient<S: AsRef<str>>(stops: &[S]) -> Result<SmallVec<[Rgba8; 4]>, String> {
    if stops.len() < 2 {
        return Err("gradient needs at least 2 stops".to_owned());
    }
    if stops.len() > MAX_GRADIENT_STOPS {
        return Err(format!(
            "gradient supports at most {MAX_GRADIENT_STOPS} stops, got {}",
            stops.len()
        ));
    }
    stops.iter().map(|s| Rgba8::parse_hex(s.as_ref())).collect()
}

/// Frame, label and background options for one sticker render.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameSpec {
    /// Variant selector.
    pub frame_type: FrameType,
    /// Label text (at most [`MAX_TEXT_CHARS`] characters).
    #[serde(default)]
    pub text_content: String,
    /// Label typography and fill.
    #[serde(default)]
    pub text_style: TextStyle,
    /// Skip every background fill.
    #[serde(default)]
    pub transparent_background: bool,
}

impl Default for FrameSpec {
    fn default() -> Self {
        Self {
            frame_type: FrameType::BottomNotch,
            text_content: "SCAN ME".to_owned(),
            text_style: TextStyle::default(),
            transparent_background: false,
        }
    }
}

impl FrameSpec {
    /// Identity spec: the sticker equals the marker.
    pub fn plain() -> Self {
        Self {
            frame_type: FrameType::Plain,
            text_content: String::new(),
            text_style: TextStyle::default(),
            transparent_background: true,
        }
    }

    /// Parse and validate a JSON frame spec.
    pub fn from_json_str(s: &str) -> PopResult<Self> {
        let spec: Self = serde_json::from_str(s)
            .map_err(|e| PopError::invalid_frame_spec(format!("frame spec json: {e}")))?;
        spec.validate()?;
        Ok(spec)
    }

    /// Check text length and gradient shape.
    pub fn validate(&self) -> PopResult<()> {
        let chars = self.text_content.chars().count();
        if chars > MAX_TEXT_CHARS {
            return Err(PopError::invalid_frame_spec(format!(
                "textContent has {chars} characters (max {MAX_TEXT_CHARS})"
            )));
        }
        if let TextFill::Gradient(stops) = &self.text_style.fill
            && !(2..=MAX_GRADIENT_STOPS).contains(&stops.len())
        {
            return Err(PopError::invalid_frame_spec(format!(
                "gradient needs 2..={MAX_GRADIENT_STOPS} stops, got {}",
                stops.len()
            )));
        }
        Ok(())
    }

    /// Replace the label text. Over-long text is rejected and the spec is left unchanged.
    pub fn set_text(&mut self, text: &str) -> PopResult<()> {
        let chars = text.chars().count();
        if chars > MAX_TEXT_CHARS {
            return Err(PopError::invalid_frame_spec(format!(
                "textContent has {chars} characters (max {MAX_TEXT_CHARS})"
            )));
        }
        self.text_content = text.to_owned();
        Ok(())
    }

    /// Switch to a flat colour; clears any gradient.
    pub fn set_color(&mut self, hex: &str) -> PopResult<()> {
        let c = Rgba8::parse_hex(hex).map_err(PopError::invalid_frame_spec)?;
        self.text_style.fill = TextFill::Solid(c);
        Ok(())
    }

    /// Switch to a gradient; clears any flat colour.
    pub fn set_gradient<S: AsRef<str>>(&mut self, stops: &[S]) -> PopResult<()> {
        let stops = parse_gradient(stops).map_err(PopError::invalid_frame_spec)?;
        self.text_style.fill = TextFill::Gradient(stops);
        Ok(())
    }

    /// Active flat colour, if any.
    pub fn color(&self) -> Option<Rgba8> {
        match &self.text_style.fill {
            TextFill::Solid(c) => Some(*c),
            TextFill::Gradient(_) => None,
        }
    }

    /// Active gradient stops, if any.
    pub fn gradient(&self) -> Option<&[Rgba8]> {
        match &self.text_style.fill {
            TextFill::Solid(_) => None,
            TextFill::Gradient(stops) => Some(stops.as_slice()),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/frame/spec.rs"]
mod tests;
