//! Client for the Emby-compatible HTTP API: catalog loading and image
//! fetching.
//!
//! This is the trust boundary for untyped data. Raw `ImageTags` /
//! `BackdropImageTags` payloads are validated into the closed
//! [`ImageType`] map here; unrecognized keys are dropped before anything
//! reaches the slot resolver.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use coverscan_model::{ImageType, Item, ItemId, ItemKind};

use crate::error::EngineError;

const PAGE_SIZE: usize = 100;

/// Image bytes as fetched from the server, with the content type the
/// server reported.
#[derive(Debug, Clone)]
pub struct FetchedImage {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl FetchedImage {
    /// File extension for export archives, derived from the content type.
    pub fn extension(&self) -> &'static str {
        match self.content_type.as_str() {
            "image/png" => "png",
            "image/webp" => "webp",
            "image/gif" => "gif",
            "image/bmp" => "bmp",
            _ => "jpg",
        }
    }
}

/// A resolved library reference from the server's view list.
#[derive(Debug, Clone)]
pub struct LibraryRef {
    pub id: String,
    pub name: String,
    pub collection_type: Option<String>,
}

pub struct JellyfinClient {
    http: reqwest::Client,
    base: Url,
    api_key: String,
}

impl std::fmt::Debug for JellyfinClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JellyfinClient")
            .field("base", &self.base.as_str())
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct UserDto {
    id: String,
    #[serde(default)]
    is_hidden: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ViewsDto {
    #[serde(default)]
    items: Vec<ViewDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ViewDto {
    id: String,
    name: String,
    #[serde(default)]
    collection_type: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ItemsPageDto {
    #[serde(default)]
    items: Vec<ItemDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ItemDto {
    id: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(rename = "Type", default)]
    item_type: Option<String>,
    #[serde(default)]
    production_year: Option<i32>,
    #[serde(default)]
    image_tags: BTreeMap<String, String>,
    #[serde(default)]
    backdrop_image_tags: Vec<String>,
}

impl JellyfinClient {
    pub fn new(base: &str, api_key: &str) -> Result<Self, EngineError> {
        let mut base = Url::parse(base.trim())?;
        // Url::join replaces the last path segment unless the base ends in
        // a slash.
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let http = reqwest::Client::builder().build()?;
        Ok(Self {
            http,
            base,
            api_key: api_key.to_owned(),
        })
    }

    fn endpoint(&self, path: &str) -> Url {
        self.base
            .join(path)
            .expect("relative API path is always joinable")
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        context: &str,
    ) -> Result<T, EngineError> {
        let resp = self
            .http
            .get(url)
            .header("X-Emby-Token", &self.api_key)
            .send()
            .await?;
        let status = resp.status();
        if status == reqwest::StatusCode::UNAUTHORIZED
            || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(EngineError::InvalidApiKey);
        }
        if !status.is_success() {
            return Err(EngineError::Api {
                status: status.as_u16(),
                context: context.to_owned(),
            });
        }
        Ok(resp.json::<T>().await?)
    }

    /// First enabled user on the server; item queries are scoped per user.
    pub async fn first_user_id(&self) -> Result<String, EngineError> {
        let users: Vec<UserDto> = self
            .get_json(self.endpoint("Users"), "listing users")
            .await?;
        users
            .into_iter()
            .find(|user| !user.is_hidden)
            .map(|user| user.id)
            .ok_or(EngineError::NoUsers)
    }

    /// Look a library up by name, case-insensitively.
    pub async fn find_library(
        &self,
        user_id: &str,
        name: &str,
    ) -> Result<LibraryRef, EngineError> {
        let views: ViewsDto = self
            .get_json(
                self.endpoint(&format!("Users/{user_id}/Views")),
                "listing libraries",
            )
            .await?;
        views
            .items
            .into_iter()
            .find(|view| view.name.eq_ignore_ascii_case(name))
            .map(|view| LibraryRef {
                id: view.id,
                name: view.name,
                collection_type: view.collection_type,
            })
            .ok_or_else(|| EngineError::LibraryNotFound(name.to_owned()))
    }

    /// All items of a library, in the order the server returns them.
    pub async fn library_items(
        &self,
        user_id: &str,
        library: &LibraryRef,
    ) -> Result<Vec<Item>, EngineError> {
        let mut items = Vec::new();
        let mut start_index = 0usize;
        loop {
            let mut url =
                self.endpoint(&format!("Users/{user_id}/Items"));
            url.query_pairs_mut()
                .append_pair("ParentId", &library.id)
                .append_pair("Recursive", "false")
                .append_pair("StartIndex", &start_index.to_string())
                .append_pair("Limit", &PAGE_SIZE.to_string());
            let page: ItemsPageDto =
                self.get_json(url, "listing library items").await?;
            let page_len = page.items.len();
            for dto in page.items {
                let kind = ItemKind::from_api_name(
                    dto.item_type.as_deref().unwrap_or_default(),
                );
                if !keep_in_collection(
                    library.collection_type.as_deref(),
                    kind,
                ) {
                    continue;
                }
                items.push(into_item(dto, kind));
            }
            if page_len < PAGE_SIZE {
                break;
            }
            start_index += PAGE_SIZE;
        }
        Ok(items)
    }

    /// URL of one image on the server, suitable for `<img src>`.
    pub fn image_url(
        &self,
        item: &ItemId,
        image_type: ImageType,
        index: u32,
        tag: &str,
    ) -> String {
        let mut url = self.endpoint(&format!(
            "Items/{}/Images/{}/{}",
            item, image_type, index
        ));
        url.query_pairs_mut()
            .append_pair("tag", tag)
            .append_pair("api_key", &self.api_key);
        url.into()
    }

    /// Link to the item's page in the server's own web UI.
    pub fn item_page_url(&self, item: &ItemId) -> String {
        format!("{}web/index.html#!/details?id={}", self.base, item)
    }

    /// Fetch one image's bytes. Failures here are per-slot recoverable.
    pub async fn fetch_image(
        &self,
        url: &str,
    ) -> Result<FetchedImage, EngineError> {
        let resp = self.http.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(EngineError::Api {
                status: status.as_u16(),
                context: "fetching image".to_owned(),
            });
        }
        let content_type = resp
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.split(';').next().unwrap_or(value).trim().to_owned())
            .unwrap_or_else(|| "image/jpeg".to_owned());
        let bytes = resp.bytes().await?.to_vec();
        Ok(FetchedImage {
            content_type,
            bytes,
        })
    }
}

fn into_item(dto: ItemDto, kind: ItemKind) -> Item {
    let image_tags =
        validate_tag_map(&dto.image_tags, &dto.backdrop_image_tags);
    Item {
        id: ItemId(dto.id),
        kind,
        title: dto.name.unwrap_or_default(),
        year: dto.production_year,
        image_tags,
    }
}

/// Collection-type filtering, matching what the server's own views show:
/// series libraries list series, movie libraries list movies, music and
/// music-video libraries their respective container kinds.
fn keep_in_collection(collection_type: Option<&str>, kind: ItemKind) -> bool {
    match collection_type
        .unwrap_or_default()
        .to_ascii_lowercase()
        .as_str()
    {
        "tvshows" | "series" => kind == ItemKind::Series,
        "movies" | "movie" => kind == ItemKind::Movie,
        "musicvideos" => matches!(
            kind,
            ItemKind::MusicArtist | ItemKind::MusicAlbum | ItemKind::Folder
        ),
        _ => true,
    }
}

/// Fold the API's untyped tag data into the closed enum map. `ImageTags`
/// carries single-slot types at index 0; backdrops come as a separate
/// positional tag array.
fn validate_tag_map(
    image_tags: &BTreeMap<String, String>,
    backdrop_tags: &[String],
) -> BTreeMap<ImageType, BTreeMap<u32, String>> {
    let mut map: BTreeMap<ImageType, BTreeMap<u32, String>> = BTreeMap::new();
    for (key, tag) in image_tags {
        match ImageType::from_api_name(key) {
            Some(image_type) => {
                map.entry(image_type)
                    .or_default()
                    .insert(0, tag.clone());
            }
            None => debug!(key, "dropping unrecognized image tag key"),
        }
    }
    for (index, tag) in backdrop_tags.iter().enumerate() {
        map.entry(ImageType::Backdrop)
            .or_default()
            .insert(index as u32, tag.clone());
    }
    map
}
