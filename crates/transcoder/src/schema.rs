//! Structural recognition of newsletter parts.
//!
//! Class attributes are deleted from the output, so nothing may dispatch
//! on them. Roles are recognized from stable traits instead: the export
//! root id, region section ids, tag names, ancestry, and child shape.

use css_email::ResolvedStyle;
use css_email::properties::{is_invisible_border, is_transparent_color};
use dom::{Document, NodeId};

/// Id of the element the export runs on.
pub const EXPORT_ROOT_ID: &str = "newsletter-root";

/// Section ids anchoring region recognition.
pub const PRICES_SECTION_ID: &str = "prices";
pub const ARTICLES_SECTION_ID: &str = "articles";
pub const RESEARCH_SECTION_ID: &str = "research";
pub const SCHEDULE_SECTION_ID: &str = "schedule";

/// A structurally recognized area of the newsletter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Region {
    Masthead,
    Prices,
    Articles,
    Research,
    Schedule,
}

/// Role of a node inside an article card.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CardPart {
    /// The media block: first card child containing an image.
    Media,
    /// First heading inside the card.
    Title,
    /// First paragraph after the title.
    Excerpt,
    /// The card's second element child, holding title/excerpt/actions.
    Content,
}

#[derive(Clone, Copy, Debug)]
struct CardShape {
    card: NodeId,
    media: Option<NodeId>,
    title: Option<NodeId>,
    excerpt: Option<NodeId>,
    content: Option<NodeId>,
    featured: bool,
}

/// Precomputed recognitions over the source subtree. Built once per
/// export; all queries are against the source tree, whose structure the
/// transform never changes.
pub struct Recognizer<'doc> {
    doc: &'doc Document,
    masthead: Option<NodeId>,
    prices: Option<NodeId>,
    articles: Option<NodeId>,
    research: Option<NodeId>,
    schedule: Option<NodeId>,
    cards: Vec<CardShape>,
}

impl<'doc> Recognizer<'doc> {
    pub fn new(doc: &'doc Document, root: NodeId) -> Self {
        let masthead = doc
            .descendants(root)
            .find(|node| doc.tag(*node) == Some("header"));
        let prices = doc.element_by_id(root, PRICES_SECTION_ID);
        let articles = doc.element_by_id(root, ARTICLES_SECTION_ID);
        let research = doc.element_by_id(root, RESEARCH_SECTION_ID);
        let schedule = doc.element_by_id(root, SCHEDULE_SECTION_ID);

        let mut cards = Vec::new();
        if let Some(articles_root) = articles {
            let article_nodes: Vec<NodeId> = doc
                .elements_in(articles_root)
                .into_iter()
                .filter(|node| doc.tag(*node) == Some("article"))
                .collect();
            for (index, card) in article_nodes.into_iter().enumerate() {
                cards.push(Self::shape_of(doc, card, index == 0));
            }
        }

        Self {
            doc,
            masthead,
            prices,
            articles,
            research,
            schedule,
            cards,
        }
    }

    fn shape_of(doc: &Document, card: NodeId, featured: bool) -> CardShape {
        let children = doc.child_elements(card);
        let media = children
            .iter()
            .copied()
            .find(|child| {
                doc.tag(*child) == Some("figure")
                    || doc.find_descendant_tag(*child, "img").is_some()
                    || doc.tag(*child) == Some("img")
            });
        let title = doc.descendants(card).find(|node| {
            matches!(doc.tag(*node), Some("h1" | "h2" | "h3" | "h4"))
        });
        let excerpt = {
            let mut past_title = title.is_none();
            let mut found = None;
            for node in doc.descendants(card) {
                if Some(node) == title {
                    past_title = true;
                    continue;
                }
                if past_title && doc.tag(node) == Some("p") {
                    found = Some(node);
                    break;
                }
            }
            found
        };
        let content = children.get(1).copied();
        CardShape {
            card,
            media,
            title,
            excerpt,
            content,
            featured,
        }
    }

    /// Region containing `node`, if any (`node` itself counts).
    pub fn region_of(&self, node: NodeId) -> Option<Region> {
        for ancestor in self.doc.ancestors(node) {
            if Some(ancestor) == self.masthead {
                return Some(Region::Masthead);
            }
            if Some(ancestor) == self.prices {
                return Some(Region::Prices);
            }
            if Some(ancestor) == self.articles {
                return Some(Region::Articles);
            }
            if Some(ancestor) == self.research {
                return Some(Region::Research);
            }
            if Some(ancestor) == self.schedule {
                return Some(Region::Schedule);
            }
        }
        None
    }

    /// Masthead and price board both clip decorative overflow in email.
    pub fn clips_overflow(&self, node: NodeId) -> bool {
        matches!(
            self.region_of(node),
            Some(Region::Masthead | Region::Prices)
        )
    }

    /// The card `node` belongs to, with its featured flag.
    pub fn card_of(&self, node: NodeId) -> Option<(NodeId, bool)> {
        for ancestor in self.doc.ancestors(node) {
            if let Some(shape) = self.cards.iter().find(|shape| shape.card == ancestor) {
                return Some((shape.card, shape.featured));
            }
        }
        None
    }

    /// Role of `node` within its card, if it has one.
    pub fn card_part_of(&self, node: NodeId) -> Option<(CardPart, bool)> {
        let (card, featured) = self.card_of(node)?;
        let shape = self.cards.iter().find(|shape| shape.card == card)?;
        let part = if Some(node) == shape.media {
            CardPart::Media
        } else if Some(node) == shape.title {
            CardPart::Title
        } else if Some(node) == shape.excerpt {
            CardPart::Excerpt
        } else if Some(node) == shape.content {
            CardPart::Content
        } else {
            return None;
        };
        Some((part, featured))
    }

    /// An image sitting inside a card's media block.
    pub fn is_media_image(&self, node: NodeId) -> Option<bool> {
        if self.doc.tag(node) != Some("img") {
            return None;
        }
        let parent = self.doc.parent(node)?;
        match self.card_part_of(parent) {
            Some((CardPart::Media, featured)) => Some(featured),
            _ => None,
        }
    }

    /// Secondary (non-featured) cards in document order.
    pub fn secondary_cards(&self) -> Vec<NodeId> {
        self.cards
            .iter()
            .filter(|shape| !shape.featured)
            .map(|shape| shape.card)
            .collect()
    }

    /// Content block of a card (its second element child).
    pub fn card_content(&self, card: NodeId) -> Option<NodeId> {
        self.cards
            .iter()
            .find(|shape| shape.card == card)
            .and_then(|shape| shape.content)
    }

    /// A row whose first element child is a heading: label left, badge
    /// right ("two-part header").
    pub fn is_two_part_header(&self, node: NodeId) -> bool {
        let children = self.doc.child_elements(node);
        children.first().is_some_and(|first| {
            matches!(
                self.doc.tag(*first),
                Some("h1" | "h2" | "h3" | "h4" | "h5" | "h6")
            )
        })
    }

    /// A ranked-list row: the first element child holds a bare ordinal.
    pub fn is_headline_row(&self, node: NodeId) -> bool {
        let children = self.doc.child_elements(node);
        children.first().is_some_and(|first| {
            let text = self.doc.text_content(*first);
            let trimmed = text.trim();
            !trimmed.is_empty()
                && trimmed.len() <= 2
                && trimmed.chars().all(|character| character.is_ascii_digit())
        })
    }

    /// A call-to-action: an anchor painted as a button (non-transparent
    /// background or a visible border).
    pub fn is_call_to_action(&self, node: NodeId, resolved: &ResolvedStyle) -> bool {
        if self.doc.tag(node) != Some("a") {
            return false;
        }
        let background = resolved.get_or_empty("background-color");
        if !background.is_empty() && !is_transparent_color(background) {
            return true;
        }
        let border = resolved.get_or_empty("border");
        !border.is_empty() && border != "none" && !is_invisible_border("border", border)
    }

    /// Coin icons on the price board get a uniform circular treatment.
    pub fn is_crypto_icon(&self, node: NodeId) -> bool {
        self.doc.tag(node) == Some("img") && self.region_of(node) == Some(Region::Prices)
    }

    pub fn is_schedule_list(&self, node: NodeId) -> bool {
        self.doc.tag(node) == Some("ul") && self.region_of(node) == Some(Region::Schedule)
    }

    pub fn is_schedule_item(&self, node: NodeId) -> bool {
        self.doc.tag(node) == Some("li") && self.region_of(node) == Some(Region::Schedule)
    }

    /// Week columns are the direct children of the schedule's grid
    /// container; the caller supplies the parent's resolved display.
    pub fn is_schedule_column(&self, node: NodeId, parent_display: &str) -> bool {
        self.region_of(node) == Some(Region::Schedule) && parent_display.contains("grid")
    }

    /// An emphasized badge inside a schedule item keeps its pill width.
    pub fn is_schedule_badge(&self, node: NodeId, resolved: &ResolvedStyle) -> bool {
        if self.doc.tag(node) != Some("span") || self.region_of(node) != Some(Region::Schedule) {
            return false;
        }
        let inside_item = self
            .doc
            .ancestors(node)
            .skip(1)
            .any(|ancestor| self.doc.tag(ancestor) == Some("li"));
        let background = resolved.get_or_empty("background-color");
        inside_item && !background.is_empty() && !is_transparent_color(background)
    }
}

/// Locate the export target in a parsed page.
pub fn find_export_root(doc: &Document) -> Option<NodeId> {
    doc.element_by_id(doc.root(), EXPORT_ROOT_ID)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dom::parse_html;

    const PAGE: &str = "<div id=\"newsletter-root\">\
        <header><h1>Daily</h1></header>\
        <section id=\"prices\"><div><img src=\"btc.png\"><div>BTC</div></div></section>\
        <section id=\"articles\">\
          <article><div><img src=\"a.png\"></div><div><h3>Big news</h3><p>Body</p><a href=\"#\">Read</a></div></article>\
          <article><div><img src=\"b.png\"></div><div><h3>Other</h3><p>More</p><a href=\"#\">Read</a></div></article>\
        </section>\
        <section id=\"schedule\"><div><div><ul><li><span>D-1</span></li></ul></div></div></section>\
        </div>";

    fn setup() -> (dom::Document, NodeId) {
        let doc = parse_html(PAGE);
        let root = find_export_root(&doc).map_or_else(|| doc.root(), |node| node);
        (doc, root)
    }

    #[test]
    fn regions_resolve_by_ancestry() {
        let (doc, root) = setup();
        let recognizer = Recognizer::new(&doc, root);
        let Some(prices) = doc.element_by_id(root, "prices") else {
            panic!("prices section missing");
        };
        let icon = doc.find_descendant_tag(prices, "img");
        assert!(icon.is_some_and(|node| recognizer.is_crypto_icon(node)));
        assert!(icon.is_some_and(|node| recognizer.clips_overflow(node)));
    }

    #[test]
    fn first_article_is_featured() {
        let (doc, root) = setup();
        let recognizer = Recognizer::new(&doc, root);
        assert_eq!(recognizer.secondary_cards().len(), 1);
        let Some(articles) = doc.element_by_id(root, "articles") else {
            panic!("articles section missing");
        };
        let Some(first_card) = doc.find_descendant_tag(articles, "article") else {
            panic!("card missing");
        };
        let Some(title) = doc.find_descendant_tag(first_card, "h3") else {
            panic!("title missing");
        };
        assert_eq!(recognizer.card_part_of(title), Some((CardPart::Title, true)));
    }

    #[test]
    fn card_parts_cover_media_excerpt_content() {
        let (doc, root) = setup();
        let recognizer = Recognizer::new(&doc, root);
        let card = recognizer.secondary_cards()[0];
        let children = doc.child_elements(card);
        assert_eq!(
            recognizer.card_part_of(children[0]),
            Some((CardPart::Media, false))
        );
        assert_eq!(
            recognizer.card_part_of(children[1]),
            Some((CardPart::Content, false))
        );
        let Some(excerpt) = doc.find_descendant_tag(card, "p") else {
            panic!("excerpt missing");
        };
        assert_eq!(
            recognizer.card_part_of(excerpt),
            Some((CardPart::Excerpt, false))
        );
        let Some(image) = doc.find_descendant_tag(card, "img") else {
            panic!("image missing");
        };
        assert_eq!(recognizer.is_media_image(image), Some(false));
    }

    #[test]
    fn headline_rows_need_a_bare_ordinal() {
        let doc = parse_html(
            "<div id=\"newsletter-root\">\
             <div id=\"ranked\"><span>1</span><a href=\"#\">Story</a></div>\
             <div id=\"plain\"><span>First</span><a href=\"#\">Story</a></div>\
             </div>",
        );
        let Some(root) = find_export_root(&doc) else {
            panic!("root missing");
        };
        let recognizer = Recognizer::new(&doc, root);
        let Some(ranked) = doc.element_by_id(root, "ranked") else {
            panic!("ranked missing");
        };
        let Some(plain) = doc.element_by_id(root, "plain") else {
            panic!("plain missing");
        };
        assert!(recognizer.is_headline_row(ranked));
        assert!(!recognizer.is_headline_row(plain));
    }

    #[test]
    fn call_to_action_requires_painted_anchor() {
        let (doc, root) = setup();
        let recognizer = Recognizer::new(&doc, root);
        let Some(anchor) = doc.find_descendant_tag(root, "a") else {
            panic!("anchor missing");
        };
        let mut painted = css_email::ResolvedStyle::new();
        painted.insert("background-color", "rgb(59, 130, 246)");
        assert!(recognizer.is_call_to_action(anchor, &painted));

        let mut plain = css_email::ResolvedStyle::new();
        plain.insert("background-color", "rgba(0, 0, 0, 0)");
        assert!(!recognizer.is_call_to_action(anchor, &plain));

        let mut ghost = css_email::ResolvedStyle::new();
        ghost.insert("background-color", "rgba(0, 0, 0, 0)");
        ghost.insert("border", "1px solid rgb(59, 130, 246)");
        assert!(recognizer.is_call_to_action(anchor, &ghost));
    }
}
