//! Block registry: the catalog of known content block types and their data
//! shapes.
//!
//! Blocks are stored and returned verbatim. The `type` tag of a block is
//! never checked on write; typed data is only produced when a consumer asks
//! for it through [`Block::content`] or [`decode_block_data`]. Unknown tags
//! decode to [`BlockContent::Unknown`].

use std::collections::HashSet;
use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::QuireError;

/// A single content block within a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    /// Caller-supplied identifier, unique within the owning page.
    pub id: String,
    /// Type tag selecting the data shape (e.g. `hero`, `text`).
    #[serde(rename = "type")]
    pub block_type: String,
    /// Raw payload whose shape depends on `block_type`.
    #[serde(default)]
    pub data: serde_json::Value,
}

#[derive(Debug, Error)]
pub enum BlockError {
    #[error("block '{id}' data cannot be decoded as {shape}: {source}")]
    Decode {
        id: String,
        shape: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("block sequence cannot be decoded: {0}")]
    DecodeSequence(#[source] serde_json::Error),

    #[error("block sequence cannot be encoded: {0}")]
    Encode(#[source] serde_json::Error),
}

impl From<BlockError> for QuireError {
    fn from(err: BlockError) -> Self {
        QuireError::Internal(err.to_string())
    }
}

/// The closed set of block type tags the registry knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockType {
    Hero,
    Text,
    Image,
    Gallery,
    Video,
    Quote,
    Code,
    Features,
    Pricing,
    Faq,
    Testimonial,
    Cta,
    Menu,
}

impl BlockType {
    pub const ALL: [BlockType; 13] = [
        BlockType::Hero,
        BlockType::Text,
        BlockType::Image,
        BlockType::Gallery,
        BlockType::Video,
        BlockType::Quote,
        BlockType::Code,
        BlockType::Features,
        BlockType::Pricing,
        BlockType::Faq,
        BlockType::Testimonial,
        BlockType::Cta,
        BlockType::Menu,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BlockType::Hero => "hero",
            BlockType::Text => "text",
            BlockType::Image => "image",
            BlockType::Gallery => "gallery",
            BlockType::Video => "video",
            BlockType::Quote => "quote",
            BlockType::Code => "code",
            BlockType::Features => "features",
            BlockType::Pricing => "pricing",
            BlockType::Faq => "faq",
            BlockType::Testimonial => "testimonial",
            BlockType::Cta => "cta",
            BlockType::Menu => "menu",
        }
    }

    /// Look up a tag. Matching is exact; `"Hero"` is not `hero`.
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == tag)
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Typed data shapes
// ---------------------------------------------------------------------------

/// Button or link.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CallToAction {
    pub text: String,
    pub url: String,
    #[serde(rename = "type", skip_serializing_if = "String::is_empty")]
    pub kind: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeroBlockData {
    pub title: String,
    pub subtitle: String,
    pub image_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cta: Option<CallToAction>,
    /// Color or gradient.
    pub background: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextBlockData {
    /// HTML or Markdown.
    pub content: String,
    pub align: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageBlockData {
    pub url: String,
    pub alt: String,
    pub caption: String,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GalleryImage {
    pub url: String,
    pub alt: String,
    pub caption: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GalleryBlockData {
    pub images: Vec<GalleryImage>,
    pub columns: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoBlockData {
    /// YouTube, Vimeo or direct video URL.
    pub url: String,
    pub title: String,
    pub description: String,
    pub autoplay: bool,
    #[serde(rename = "loop")]
    pub looped: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuoteBlockData {
    pub text: String,
    pub author: String,
    pub source: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodeBlockData {
    pub code: String,
    pub language: String,
    pub filename: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureItem {
    pub title: String,
    pub description: String,
    /// Icon name or URL.
    pub icon: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeaturesBlockData {
    pub title: String,
    pub subtitle: String,
    pub items: Vec<FeatureItem>,
    pub columns: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingPlan {
    pub name: String,
    /// Display price, e.g. `$99/month`.
    pub price: String,
    pub description: String,
    pub features: Vec<String>,
    pub button_text: String,
    pub button_url: String,
    pub highlighted: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingBlockData {
    pub title: String,
    pub subtitle: String,
    pub plans: Vec<PricingPlan>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FaqItem {
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FaqBlockData {
    pub title: String,
    pub items: Vec<FaqItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TestimonialItem {
    pub quote: String,
    pub author: String,
    pub avatar_url: String,
    /// e.g. `CEO, Company Name`.
    pub role: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TestimonialBlockData {
    pub title: String,
    pub subtitle: String,
    pub testimonials: Vec<TestimonialItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CtaBlockData {
    pub title: String,
    pub subtitle: String,
    pub button_text: String,
    pub button_url: String,
    pub button_style: String,
    pub background: String,
}

/// References a [`Menu`](crate::models::menu::Menu) by id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MenuBlockData {
    pub menu_id: String,
    /// `horizontal`, `vertical` or `dropdown`.
    pub style: String,
}

/// Typed view of a block, produced on demand.
#[derive(Debug, Clone, PartialEq)]
pub enum BlockContent {
    Hero(HeroBlockData),
    Text(TextBlockData),
    Image(ImageBlockData),
    Gallery(GalleryBlockData),
    Video(VideoBlockData),
    Quote(QuoteBlockData),
    Code(CodeBlockData),
    Features(FeaturesBlockData),
    Pricing(PricingBlockData),
    Faq(FaqBlockData),
    Testimonial(TestimonialBlockData),
    Cta(CtaBlockData),
    Menu(MenuBlockData),
    /// A tag the registry does not know; the payload is passed through.
    Unknown {
        block_type: String,
        data: serde_json::Value,
    },
}

impl Block {
    pub fn new(id: impl Into<String>, block_type: BlockType, data: serde_json::Value) -> Self {
        Self {
            id: id.into(),
            block_type: block_type.as_str().to_string(),
            data,
        }
    }

    /// The registered type for this block's tag, if any.
    pub fn known_type(&self) -> Option<BlockType> {
        BlockType::from_tag(&self.block_type)
    }

    /// Decode the payload into the shape registered for the block's tag.
    pub fn content(&self) -> Result<BlockContent, BlockError> {
        let Some(block_type) = self.known_type() else {
            return Ok(BlockContent::Unknown {
                block_type: self.block_type.clone(),
                data: self.data.clone(),
            });
        };

        Ok(match block_type {
            BlockType::Hero => BlockContent::Hero(decode_block_data(self)?),
            BlockType::Text => BlockContent::Text(decode_block_data(self)?),
            BlockType::Image => BlockContent::Image(decode_block_data(self)?),
            BlockType::Gallery => BlockContent::Gallery(decode_block_data(self)?),
            BlockType::Video => BlockContent::Video(decode_block_data(self)?),
            BlockType::Quote => BlockContent::Quote(decode_block_data(self)?),
            BlockType::Code => BlockContent::Code(decode_block_data(self)?),
            BlockType::Features => BlockContent::Features(decode_block_data(self)?),
            BlockType::Pricing => BlockContent::Pricing(decode_block_data(self)?),
            BlockType::Faq => BlockContent::Faq(decode_block_data(self)?),
            BlockType::Testimonial => BlockContent::Testimonial(decode_block_data(self)?),
            BlockType::Cta => BlockContent::Cta(decode_block_data(self)?),
            BlockType::Menu => BlockContent::Menu(decode_block_data(self)?),
        })
    }
}

/// Decode a block's payload into `T`.
///
/// Only deserializability is checked: unknown fields are ignored and, for
/// the registry shapes, missing fields take their zero value. A `null`
/// payload decodes like an empty object.
pub fn decode_block_data<T: DeserializeOwned>(block: &Block) -> Result<T, BlockError> {
    let data = match &block.data {
        serde_json::Value::Null => serde_json::Value::Object(serde_json::Map::new()),
        other => other.clone(),
    };
    serde_json::from_value(data).map_err(|source| BlockError::Decode {
        id: block.id.clone(),
        shape: std::any::type_name::<T>(),
        source,
    })
}

/// Serialize a block sequence into its stored form.
pub fn encode_blocks(blocks: &[Block]) -> Result<String, BlockError> {
    serde_json::to_string(blocks).map_err(BlockError::Encode)
}

/// Parse a stored block sequence. Blank input is an empty sequence.
pub fn decode_blocks(raw: &str) -> Result<Vec<Block>, BlockError> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(raw).map_err(BlockError::DecodeSequence)
}

/// Check that every block has a non-empty id and ids are unique.
pub fn validate_block_ids(blocks: &[Block]) -> Result<(), QuireError> {
    let mut seen = HashSet::with_capacity(blocks.len());
    for (index, block) in blocks.iter().enumerate() {
        if block.id.trim().is_empty() {
            return Err(QuireError::validation(format!(
                "block at position {index} is missing an id"
            )));
        }
        if !seen.insert(block.id.as_str()) {
            return Err(QuireError::validation(format!(
                "duplicate block id '{}'",
                block.id
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_blocks() -> Vec<Block> {
        vec![
            Block::new(
                "b1",
                BlockType::Hero,
                json!({"title": "Hero Title", "subtitle": "Hero Subtitle"}),
            ),
            Block::new(
                "b2",
                BlockType::Text,
                json!({"content": "<p>Hello World</p>", "align": "left"}),
            ),
        ]
    }

    #[test]
    fn tags_roundtrip_through_lookup() {
        for t in BlockType::ALL {
            assert_eq!(BlockType::from_tag(t.as_str()), Some(t));
        }
        assert_eq!(BlockType::from_tag("carousel"), None);
        assert_eq!(BlockType::from_tag("Hero"), None);
    }

    #[test]
    fn wire_shape_uses_type_key() {
        let block = Block::new("x", BlockType::Quote, json!({"text": "hi"}));
        let value = serde_json::to_value(&block).unwrap();
        assert_eq!(value, json!({"id": "x", "type": "quote", "data": {"text": "hi"}}));
    }

    #[test]
    fn encoded_sequence_is_byte_stable() {
        let raw = r#"[{"id":"a","type":"hero","data":{"zeta":1,"alpha":{"b":2,"a":1}}},{"id":"b","type":"whatever","data":[1,"two",null]}]"#;
        let blocks = decode_blocks(raw).unwrap();
        assert_eq!(encode_blocks(&blocks).unwrap(), raw);

        let original = sample_blocks();
        let encoded = encode_blocks(&original).unwrap();
        assert_eq!(decode_blocks(&encoded).unwrap(), original);
    }

    #[test]
    fn blank_sequence_decodes_empty() {
        assert!(decode_blocks("").unwrap().is_empty());
        assert!(decode_blocks("[]").unwrap().is_empty());
        assert!(decode_blocks("{not json").is_err());
    }

    #[test]
    fn typed_decode_ignores_extra_and_defaults_missing() {
        let block = Block::new(
            "h",
            BlockType::Hero,
            json!({"title": "Welcome", "unexpected": true}),
        );
        let hero: HeroBlockData = decode_block_data(&block).unwrap();
        assert_eq!(hero.title, "Welcome");
        assert_eq!(hero.subtitle, "");
        assert!(hero.cta.is_none());
    }

    #[test]
    fn typed_decode_rejects_wrong_shape() {
        let block = Block::new("i", BlockType::Image, json!({"width": "wide"}));
        let err = decode_block_data::<ImageBlockData>(&block).unwrap_err();
        assert!(matches!(err, BlockError::Decode { ref id, .. } if id == "i"));
    }

    #[test]
    fn content_dispatches_on_tag() {
        let blocks = sample_blocks();
        match blocks[1].content().unwrap() {
            BlockContent::Text(text) => {
                assert_eq!(text.content, "<p>Hello World</p>");
                assert_eq!(text.align, "left");
            }
            other => panic!("expected text block, got {other:?}"),
        }

        let pricing = Block::new(
            "p",
            BlockType::Pricing,
            json!({"plans": [{"name": "Pro", "price": "$9", "features": ["a", "b"], "highlighted": true}]}),
        );
        let BlockContent::Pricing(data) = pricing.content().unwrap() else {
            panic!("expected pricing block");
        };
        assert_eq!(data.plans.len(), 1);
        assert!(data.plans[0].highlighted);
        assert_eq!(data.plans[0].features, vec!["a", "b"]);
    }

    #[test]
    fn unknown_tag_passes_payload_through() {
        let block = Block {
            id: "u".into(),
            block_type: "carousel".into(),
            data: json!({"slides": 3}),
        };
        assert_eq!(
            block.content().unwrap(),
            BlockContent::Unknown {
                block_type: "carousel".into(),
                data: json!({"slides": 3}),
            }
        );
    }

    #[test]
    fn null_payload_decodes_as_defaults() {
        let block = Block::new("m", BlockType::Menu, serde_json::Value::Null);
        let BlockContent::Menu(menu) = block.content().unwrap() else {
            panic!("expected menu block");
        };
        assert_eq!(menu, MenuBlockData::default());
    }

    #[test]
    fn block_ids_must_be_present_and_unique() {
        assert!(validate_block_ids(&sample_blocks()).is_ok());

        let mut dup = sample_blocks();
        dup[1].id = "b1".into();
        assert!(matches!(
            validate_block_ids(&dup),
            Err(QuireError::Validation { .. })
        ));

        let mut blank = sample_blocks();
        blank[0].id = " ".into();
        assert!(validate_block_ids(&blank).is_err());
    }
}
