use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

pub const DEFAULT_USERNAME: &str = "Reader";
pub const DEFAULT_THEME: &str = "light";

// 文档由展示端自由写入，字段类型不可信：
// 只有类型匹配的值才进入对应字段，其余留在 `extra` 中原样写回

fn take_string(map: &mut Map<String, Value>, key: &str) -> Option<String> {
    match map.get(key) {
        Some(Value::String(_)) => match map.remove(key) {
            Some(Value::String(s)) => Some(s),
            _ => None,
        },
        _ => None,
    }
}

fn take_f64(map: &mut Map<String, Value>, key: &str) -> Option<f64> {
    if map.get(key).map_or(false, Value::is_number) {
        map.remove(key).and_then(|v| v.as_f64())
    } else {
        None
    }
}

fn take_bool(map: &mut Map<String, Value>, key: &str) -> Option<bool> {
    if map.get(key).map_or(false, Value::is_boolean) {
        map.remove(key).and_then(|v| v.as_bool())
    } else {
        None
    }
}

/// 用户资料（data/user.json）
/// 缺失或类型不符的字段按默认值补齐；未识别的字段原样保留
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "Map<String, Value>")]
pub struct UserProfile {
    pub username: String,
    pub theme: String, // "light" or "dark"
    pub is_first_time: bool,
    /// 贴纸槽位 ID -> 自定义位置/样式
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub sticker_customizations: BTreeMap<String, StickerCustomization>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub custom_stickers: Vec<CustomSticker>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for UserProfile {
    fn default() -> Self {
        Self {
            username: DEFAULT_USERNAME.to_string(),
            theme: DEFAULT_THEME.to_string(),
            is_first_time: true,
            sticker_customizations: BTreeMap::new(),
            custom_stickers: Vec::new(),
            extra: Map::new(),
        }
    }
}

impl From<Map<String, Value>> for UserProfile {
    fn from(mut map: Map<String, Value>) -> Self {
        let defaults = Self::default();
        let username = take_string(&mut map, "username").unwrap_or(defaults.username);
        let theme = take_string(&mut map, "theme").unwrap_or(defaults.theme);
        let is_first_time = take_bool(&mut map, "isFirstTime").unwrap_or(defaults.is_first_time);

        let sticker_customizations = match map.remove("stickerCustomizations") {
            Some(Value::Object(slots)) => slots
                .into_iter()
                .filter_map(|(slot, value)| match value {
                    Value::Object(fields) => Some((slot, StickerCustomization::from(fields))),
                    _ => None,
                })
                .collect(),
            _ => BTreeMap::new(),
        };
        let custom_stickers = match map.remove("customStickers") {
            Some(Value::Array(items)) => items
                .into_iter()
                .filter_map(|value| match value {
                    Value::Object(fields) => Some(CustomSticker::from(fields)),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        };

        // 类型不符的已知字段已被默认值取代，不能再以同名键写回
        for key in ["username", "theme", "isFirstTime"] {
            map.remove(key);
        }

        Self {
            username,
            theme,
            is_first_time,
            sticker_customizations,
            custom_stickers,
            extra: map,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Map<String, Value>")]
pub struct StickerCustomization {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub left: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bottom: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub right: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl From<Map<String, Value>> for StickerCustomization {
    fn from(mut map: Map<String, Value>) -> Self {
        Self {
            src: take_string(&mut map, "src"),
            size: take_f64(&mut map, "size"),
            rotation: take_f64(&mut map, "rotation"),
            left: take_f64(&mut map, "left"),
            top: take_f64(&mut map, "top"),
            bottom: take_f64(&mut map, "bottom"),
            right: take_f64(&mut map, "right"),
            extra: map,
        }
    }
}

/// 用户导入的贴纸，`src` 为 stickers 目录下的文件名
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Map<String, Value>")]
pub struct CustomSticker {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub left: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl From<Map<String, Value>> for CustomSticker {
    fn from(mut map: Map<String, Value>) -> Self {
        Self {
            src: take_string(&mut map, "src"),
            size: take_f64(&mut map, "size"),
            rotation: take_f64(&mut map, "rotation"),
            left: take_f64(&mut map, "left"),
            top: take_f64(&mut map, "top"),
            extra: map,
        }
    }
}

/// 书架上的一本书
/// 展示端保存的书籍可能缺少部分字段或类型不符，读取时全部按可选处理；
/// 不是对象的条目整体保存在 `opaque` 中，写回时原样输出
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub struct Book {
    pub id: Option<String>,
    /// book-covers 目录下的文件名
    pub cover_path: Option<String>,
    pub title: Option<String>,
    pub created_at: Option<String>, // ISO-8601
    pub added_at: Option<String>,
    pub extra: Map<String, Value>,
    pub opaque: Option<Value>,
}

impl From<Value> for Book {
    fn from(value: Value) -> Self {
        let mut map = match value {
            Value::Object(map) => map,
            other => {
                return Self {
                    opaque: Some(other),
                    ..Self::default()
                }
            }
        };
        Self {
            id: take_string(&mut map, "id"),
            cover_path: take_string(&mut map, "coverPath"),
            title: take_string(&mut map, "title"),
            created_at: take_string(&mut map, "createdAt"),
            added_at: take_string(&mut map, "addedAt"),
            extra: map,
            opaque: None,
        }
    }
}

impl From<Book> for Value {
    fn from(book: Book) -> Self {
        if let Some(raw) = book.opaque {
            return raw;
        }
        let mut map = book.extra;
        let fields = [
            ("id", book.id),
            ("coverPath", book.cover_path),
            ("title", book.title),
            ("createdAt", book.created_at),
            ("addedAt", book.added_at),
        ];
        for (key, value) in fields {
            if let Some(value) = value {
                map.insert(key.to_string(), Value::String(value));
            }
        }
        Value::Object(map)
    }
}

/// 书籍集合（data/books.json）
/// 只有顶层不是对象或 `collection` 不是数组时才视为损坏
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BookCollection {
    #[serde(default)]
    pub collection: Vec<Book>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl BookCollection {
    pub fn new(collection: Vec<Book>) -> Self {
        Self {
            collection,
            extra: Map::new(),
        }
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.collection
            .iter()
            .any(|b| b.id.as_deref() == Some(id))
    }
}

/// create-book 的请求体：任意书籍字段，`id` 与 `createdAt` 由宿主生成
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(from = "Map<String, Value>")]
pub struct BookDraft {
    pub cover_path: Option<String>,
    pub title: Option<String>,
    pub added_at: Option<String>,
    pub extra: Map<String, Value>,
}

impl From<Map<String, Value>> for BookDraft {
    fn from(mut map: Map<String, Value>) -> Self {
        Self {
            cover_path: take_string(&mut map, "coverPath"),
            title: take_string(&mut map, "title"),
            added_at: take_string(&mut map, "addedAt"),
            extra: map,
        }
    }
}

impl BookDraft {
    pub fn into_book(mut self, id: String, created_at: String) -> Book {
        self.extra.remove("id");
        self.extra.remove("createdAt");
        Book {
            id: Some(id),
            cover_path: self.cover_path,
            title: self.title,
            created_at: Some(created_at),
            added_at: self.added_at,
            extra: self.extra,
            opaque: None,
        }
    }
}
