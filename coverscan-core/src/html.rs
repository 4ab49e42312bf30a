//! HTML gallery rendering.
//!
//! One self-contained document per run: a summary table up front, then a
//! two-column gallery block per item, all sharing a per-item lightbox. The
//! markup is a pure function of the report and options; nothing
//! time-dependent or random is embedded, so identical inputs render
//! byte-identically.

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};

use coverscan_model::{
    ColorScheme, GalleryColumn, ImageType, Report, ReportRow, Slot, SlotRef,
};

use crate::engine::SlotAssets;
use crate::jellyfin::JellyfinClient;

// Within the right column, Box/BoxRear/Disc share one row at a third of
// the width each.
const BOX_ROW_TYPES: [ImageType; 3] =
    [ImageType::Box, ImageType::BoxRear, ImageType::Disc];

/// Rendering inputs beyond the report itself.
#[derive(Debug)]
pub struct RenderOptions<'a> {
    pub colors: ColorScheme,
    /// Inline fetched bytes as data URIs instead of linking back to the
    /// server.
    pub embedded: bool,
    /// Builds image and item-page URLs for the source server.
    pub client: &'a JellyfinClient,
    /// Fetched bytes, consulted only in embedded mode. A present slot with
    /// no entry (failed probe) falls back to its server URL.
    pub assets: &'a SlotAssets,
}

/// Render the whole report document.
pub fn render(report: &Report, options: &RenderOptions<'_>) -> String {
    let mut out = String::with_capacity(64 * 1024);
    out.push_str(&header(&report.library_name, &options.colors));
    out.push_str(&summary_table(report, options));
    for row in &report.rows {
        out.push_str(&entry_block(row, report, options));
    }
    out.push_str(LIGHTBOX);
    out.push_str("</body>\n</html>\n");
    out
}

fn header(library_name: &str, colors: &ColorScheme) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Artwork Report - {title}</title>
<style>
body {{ font-family: sans-serif; font-size: 18px; background-color: {bg}; color: {fg}; }}
h1 {{ font-size: 36px; margin-bottom: 20px; }}
h2 {{ font-size: 28px; margin: 20px 0; text-align: center; }}
table {{ border-collapse: collapse; margin-bottom: 40px; width: 100%; background-color: {table_bg}; }}
th, td {{ border: 1px solid #ccc; padding: 8px; text-align: left; font-size: 18px; color: {fg}; }}
th {{ background-color: rgba(200,200,200,0.2); }}
td.ok {{ color: #4c4; text-align: center; }}
td.missing {{ color: red; text-align: center; }}
td.lowres {{ color: orange; text-align: center; }}
a {{ color: {fg}; text-decoration: none; }}
a:hover {{ text-decoration: underline; }}
a.external {{ opacity: 0.7; margin-left: 6px; }}
.entry {{ margin-bottom: 50px; display: flex; flex-direction: column; border: 2px solid #555; padding: 15px; border-radius: 10px; }}
.entry-title {{ margin-bottom: 15px; }}
.image-row {{ display: flex; gap: 16px; margin-top: 15px; }}
.left-column {{ flex: 0 0 33%; display: flex; flex-direction: column; min-width: 0; }}
.right-column {{ flex: 0 0 67%; display: flex; flex-direction: column; gap: 10px; min-width: 0; }}
.artwork {{ position: relative; margin-bottom: 10px; }}
.artwork img {{ width: 100%; height: auto; display: block; cursor: pointer; border: 2px solid #ccc; border-radius: 5px; }}
.artwork img.logo-img {{ width: 60%; }}
.box-row {{ display: flex; gap: 10px; }}
.box-row .artwork {{ flex: 1 1 0; }}
.caption {{ font-size: 14px; opacity: 0.9; }}
.caption.low {{ color: red; opacity: 1; }}
.placeholder {{ border: 2px dashed red; border-radius: 5px; color: red; font-weight: bold; display: flex; align-items: center; justify-content: center; height: 150px; }}
.missing-list {{ color: red; font-weight: bold; text-align: center; margin-top: auto; }}
.scroll-top {{ text-align: center; margin-top: 10px; }}
.lightbox {{ display: none; position: fixed; z-index: 999; padding-top: 60px; left: 0; top: 0; width: 100%; height: 100%; overflow: auto; background-color: rgba(0,0,0,0.9); }}
.lightbox-content {{ position: relative; margin: auto; max-width: 90%; max-height: 90%; text-align: center; }}
.lightbox-caption {{ color: #fff; font-size: 18px; margin-bottom: 10px; }}
.lightbox-content img {{ max-width: 100%; max-height: 80vh; margin-top: 10px; cursor: pointer; }}
.lightbox-buttons {{ margin-top: 10px; }}
.lightbox-buttons button {{ font-size: 16px; padding: 10px 16px; min-width: 110px; line-height: 1; border-radius: 6px; }}
</style>
</head>
<body>
<h1 id="top">{title}</h1>
"#,
        title = escape(library_name),
        bg = escape(&colors.background),
        fg = escape(&colors.text),
        table_bg = escape(&colors.table_background),
    )
}

fn summary_table(report: &Report, options: &RenderOptions<'_>) -> String {
    let mut out = String::new();
    out.push_str("<h2>Artwork Summary</h2>\n<table>\n<tr><th>Item</th>");
    for image_type in &report.tracked {
        out.push_str(&format!("<th>{image_type}</th>"));
    }
    out.push_str("</tr>\n");
    for row in &report.rows {
        let page_url = options.client.item_page_url(&row.item.id);
        out.push_str(&format!(
            r##"<tr><td><a href="#item-{id}">{title}</a><a class="external" target="_blank" href="{page}">&#8599;</a></td>"##,
            id = escape(row.item.id.as_str()),
            title = escape(&row.display_title),
            page = escape(&page_url),
        ));
        for image_type in &report.tracked {
            out.push_str(&summary_cell(row, *image_type));
        }
        out.push_str("</tr>\n");
    }
    out.push_str("</table>\n");
    out
}

fn summary_cell(row: &ReportRow, image_type: ImageType) -> String {
    let slots: Vec<&Slot> = row
        .slots
        .iter()
        .filter(|slot| slot.image_type == image_type)
        .collect();
    let present = slots.iter().filter(|slot| slot.is_present()).count();
    if present == 0 {
        return r#"<td class="missing">&#10008;</td>"#.to_owned();
    }
    let count = if present > 1 {
        format!(" {present}")
    } else {
        String::new()
    };
    if slots.iter().any(|slot| slot.low_resolution) {
        format!(r#"<td class="lowres">&#9888;{count}</td>"#)
    } else {
        format!(r#"<td class="ok">&#10004;{count}</td>"#)
    }
}

fn entry_block(
    row: &ReportRow,
    report: &Report,
    options: &RenderOptions<'_>,
) -> String {
    let mut out = String::new();
    let page_url = options.client.item_page_url(&row.item.id);
    out.push_str(&format!(
        r#"<div class="entry" id="item-{id}">
<h2 class="entry-title"><a target="_blank" href="{page}">{title}</a></h2>
<div class="image-row">
"#,
        id = escape(row.item.id.as_str()),
        page = escape(&page_url),
        title = escape(&row.display_title),
    ));

    // Left column with the missing list pinned to its bottom.
    out.push_str("<div class=\"left-column\">\n");
    for image_type in &report.tracked {
        if image_type.column() == GalleryColumn::Left {
            out.push_str(&type_blocks(row, *image_type, "", options));
        }
    }
    let missing: Vec<String> = row
        .slots
        .iter()
        .filter(|slot| !slot.is_present())
        .map(Slot::label)
        .collect();
    if !missing.is_empty() {
        out.push_str(&format!(
            "<div class=\"missing-list\">Missing:<br>{}</div>\n",
            escape(&missing.join(", "))
        ));
    }
    out.push_str("</div>\n");

    out.push_str("<div class=\"right-column\">\n");
    for image_type in [ImageType::Backdrop, ImageType::Banner] {
        if report.tracked.contains(&image_type) {
            out.push_str(&type_blocks(row, image_type, "", options));
        }
    }
    if BOX_ROW_TYPES
        .iter()
        .any(|image_type| report.tracked.contains(image_type))
    {
        out.push_str("<div class=\"box-row\">\n");
        for image_type in BOX_ROW_TYPES {
            if report.tracked.contains(&image_type) {
                out.push_str(&type_blocks(row, image_type, "", options));
            }
        }
        out.push_str("</div>\n");
    }
    if report.tracked.contains(&ImageType::Logo) {
        out.push_str(&type_blocks(row, ImageType::Logo, "logo-img", options));
    }
    out.push_str("</div>\n");

    out.push_str(
        "</div>\n<div class=\"scroll-top\"><a href=\"#top\">&#8593; Back to top</a></div>\n</div>\n",
    );
    out
}

fn type_blocks(
    row: &ReportRow,
    image_type: ImageType,
    img_class: &str,
    options: &RenderOptions<'_>,
) -> String {
    let mut out = String::new();
    for slot in row
        .slots
        .iter()
        .filter(|slot| slot.image_type == image_type)
    {
        out.push_str(&slot_block(row, slot, img_class, options));
    }
    out
}

fn slot_block(
    row: &ReportRow,
    slot: &Slot,
    img_class: &str,
    options: &RenderOptions<'_>,
) -> String {
    let Some(tag) = slot.tag.as_deref() else {
        return format!(
            "<div class=\"artwork\"><div class=\"placeholder\">Missing: {}</div></div>\n",
            escape(&slot.label())
        );
    };

    let caption = match slot.dimensions {
        Some(dims) => format!("{} {}", slot.label(), dims),
        None => format!("{} (resolution unknown)", slot.label()),
    };
    let caption_class = if slot.low_resolution {
        "caption low"
    } else {
        "caption"
    };
    let class_attr = if img_class.is_empty() {
        String::new()
    } else {
        format!(" class=\"{img_class}\"")
    };
    let src = slot_src(row, slot, tag, options);
    format!(
        r#"<div class="artwork">
<img{class_attr} src="{src}" alt="{caption}" loading="lazy" onclick="openLightbox('{id}', this)">
<div class="{caption_class}">{caption}</div>
</div>
"#,
        src = escape(&src),
        caption = escape(&caption),
        id = escape(row.item.id.as_str()),
    )
}

fn slot_src(
    row: &ReportRow,
    slot: &Slot,
    tag: &str,
    options: &RenderOptions<'_>,
) -> String {
    if options.embedded {
        let slot_ref =
            SlotRef::new(&row.item.id, slot.image_type, slot.index);
        if let Some(asset) = options.assets.get(&slot_ref) {
            return format!(
                "data:{};base64,{}",
                asset.content_type,
                BASE64.encode(&asset.bytes)
            );
        }
    }
    options
        .client
        .image_url(&row.item.id, slot.image_type, slot.index, tag)
}

// The lightbox cycles through the clicked item's present images only.
// Clicking the enlarged image advances instead of dismissing, and the
// thumbnails stay plain <img> elements so middle-click and "save image"
// keep working.
const LIGHTBOX: &str = r#"<div id="lightbox" class="lightbox" onclick="clickOutside(event)">
  <div class="lightbox-content">
    <div class="lightbox-caption" id="lightbox-caption"></div>
    <img id="lightbox-img" src="" onclick="nextImage(event)">
    <div class="lightbox-buttons">
      <button onclick="prevImage(event)">&#9664; Prev</button>
      <button onclick="nextImage(event)">Next &#9654;</button>
      <button onclick="closeLightbox()">Close &#10006;</button>
    </div>
  </div>
</div>
<script>
let currentImages = [];
let currentIndex = 0;

function openLightbox(entryId, el) {
  currentImages = [];
  const imgs = document.querySelectorAll('#item-' + CSS.escape(entryId) + ' .artwork img');
  imgs.forEach(i => currentImages.push({src: i.src, caption: i.alt || ''}));
  const idx = currentImages.findIndex(i => i.src === el.src);
  currentIndex = idx >= 0 ? idx : 0;
  showImage();
  document.getElementById('lightbox').style.display = 'block';
}

function showImage() {
  if (!currentImages.length) return;
  document.getElementById('lightbox-img').src = currentImages[currentIndex].src;
  document.getElementById('lightbox-caption').innerText = currentImages[currentIndex].caption;
}

function closeLightbox() {
  document.getElementById('lightbox').style.display = 'none';
  currentImages = [];
  currentIndex = 0;
}

function prevImage(e) { e.stopPropagation(); if (!currentImages.length) return; currentIndex = (currentIndex - 1 + currentImages.length) % currentImages.length; showImage(); }
function nextImage(e) { e.stopPropagation(); if (!currentImages.length) return; currentIndex = (currentIndex + 1) % currentImages.length; showImage(); }
function clickOutside(e) { if (e.target.id === 'lightbox') { closeLightbox(); } }

document.addEventListener('keydown', function(e) {
  if (e.key === 'Escape') closeLightbox();
  else if (e.key === 'ArrowLeft') prevImage(e);
  else if (e.key === 'ArrowRight') nextImage(e);
});
</script>
"#;

/// Minimal HTML escaping for text and attribute contexts.
pub fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::aggregate;
    use coverscan_model::{Dimensions, Item, ItemId, ItemKind};
    use std::collections::{BTreeMap, HashMap};

    fn client() -> JellyfinClient {
        JellyfinClient::new("http://media.example:8096", "key").unwrap()
    }

    fn sample_report() -> Report {
        let mut tags: BTreeMap<_, BTreeMap<u32, String>> = BTreeMap::new();
        tags.entry(ImageType::Primary)
            .or_default()
            .insert(0, "aa".to_owned());
        tags.entry(ImageType::Backdrop)
            .or_default()
            .insert(0, "b0".to_owned());
        let item = Item {
            id: ItemId::from("item-1"),
            kind: ItemKind::Movie,
            title: "Bar".to_owned(),
            year: Some(1999),
            image_tags: tags,
        };
        let mut primary = coverscan_model::Slot::present(ImageType::Primary, 0, "aa");
        primary.dimensions = Some(Dimensions::try_from((200, 300)).unwrap());
        primary.low_resolution = true;
        let backdrop = coverscan_model::Slot::present(ImageType::Backdrop, 0, "b0");
        let logo = coverscan_model::Slot::absent(ImageType::Logo, 0);
        aggregate(
            "My Movies",
            &[ImageType::Primary, ImageType::Backdrop, ImageType::Logo],
            vec![item],
            vec![vec![primary, backdrop, logo]],
            Vec::new(),
        )
    }

    #[test]
    fn test_render_is_deterministic() {
        let report = sample_report();
        let client = client();
        let assets = HashMap::new();
        let options = RenderOptions {
            colors: ColorScheme::default(),
            embedded: false,
            client: &client,
            assets: &assets,
        };
        assert_eq!(render(&report, &options), render(&report, &options));
    }

    #[test]
    fn test_summary_columns_follow_canonical_order() {
        let report = sample_report();
        let client = client();
        let assets = HashMap::new();
        let options = RenderOptions {
            colors: ColorScheme::default(),
            embedded: false,
            client: &client,
            assets: &assets,
        };
        let html = render(&report, &options);
        let primary = html.find("<th>Primary</th>").unwrap();
        let backdrop = html.find("<th>Backdrop</th>").unwrap();
        let logo = html.find("<th>Logo</th>").unwrap();
        assert!(primary < backdrop && backdrop < logo);
    }

    #[test]
    fn test_missing_and_low_res_markup() {
        let report = sample_report();
        let client = client();
        let assets = HashMap::new();
        let options = RenderOptions {
            colors: ColorScheme::default(),
            embedded: false,
            client: &client,
            assets: &assets,
        };
        let html = render(&report, &options);
        assert!(html.contains("Missing: Logo"));
        assert!(html.contains("caption low"));
        assert!(html.contains("Primary 200×300"));
        // Movie titles always carry the year.
        assert!(html.contains("Bar (1999)"));
        // No timestamps in the markup.
        assert!(!html.contains("Generated"));
    }

    #[test]
    fn test_embedded_mode_inlines_bytes() {
        let report = sample_report();
        let client = client();
        let mut assets: SlotAssets = HashMap::new();
        assets.insert(
            SlotRef::new(&ItemId::from("item-1"), ImageType::Primary, 0),
            crate::jellyfin::FetchedImage {
                content_type: "image/png".to_owned(),
                bytes: vec![1, 2, 3],
            },
        );
        let options = RenderOptions {
            colors: ColorScheme::default(),
            embedded: true,
            client: &client,
            assets: &assets,
        };
        let html = render(&report, &options);
        assert!(html.contains("data:image/png;base64,AQID"));
        // The backdrop has no fetched bytes and falls back to its URL.
        assert!(html.contains("Items/item-1/Images/Backdrop/0"));
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape("a<b>&\"c\""), "a&lt;b&gt;&amp;&quot;c&quot;");
    }
}
