//! Shared fixtures for unit tests: a `Note` entity with one field of every
//! primitive family, a `Tag` entity the store schema never registers, and a
//! memory-backed session.

use crate::{
    db::{
        Session,
        record::{RecordAccessor, RecordReader},
        store::{MemoryStore, StoreSchema},
    },
    key::FieldKey,
    traits::{EntityKind, Identifiable, StringRepresentable},
    types::{Timestamp, Urn},
};
use recordq_derive::FieldKey;
use ulid::Ulid;

///
/// NoteKey
///

#[derive(Clone, Copy, Debug, Eq, FieldKey, Hash, PartialEq)]
pub(crate) enum NoteKey {
    Urn,
    Title,
    Body,
    Date,
    #[key(rename = "editedAt")]
    EditedAt,
    Rating,
    Pinned,
    ViewCount,
    Priority,
    Status,
    Attachment,
    Author,
}

///
/// Status
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub(crate) enum Status {
    #[default]
    Draft,
    Published,
    Archived,
}

impl StringRepresentable for Status {
    fn string_value(&self) -> String {
        match self {
            Self::Draft => "draft",
            Self::Published => "published",
            Self::Archived => "archived",
        }
        .to_string()
    }

    fn from_string_value(value: &str) -> Option<Self> {
        match value {
            "draft" => Some(Self::Draft),
            "published" => Some(Self::Published),
            "archived" => Some(Self::Archived),
            _ => None,
        }
    }
}

///
/// Note
///

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Note {
    pub(crate) urn: Urn,
    pub(crate) title: String,
    pub(crate) body: Option<String>,
    pub(crate) date: Timestamp,
    pub(crate) edited_at: Option<Timestamp>,
    pub(crate) rating: Option<f64>,
    pub(crate) pinned: bool,
    pub(crate) view_count: i64,
    pub(crate) priority: i16,
    pub(crate) status: Status,
    pub(crate) attachment: Option<Vec<u8>>,
    pub(crate) author: Option<Ulid>,
}

impl Note {
    pub(crate) fn new(urn: &str, title: &str, date: Timestamp) -> Self {
        Self {
            urn: self::urn(urn),
            title: title.to_string(),
            body: None,
            date,
            edited_at: None,
            rating: None,
            pinned: false,
            view_count: 0,
            priority: 0,
            status: Status::Draft,
            attachment: None,
            author: None,
        }
    }
}

impl EntityKind for Note {
    type Key = NoteKey;

    const ENTITY_NAME: &'static str = "Note";

    fn from_record(record: &RecordReader<'_, Self>) -> Option<Self> {
        Some(Self {
            urn: record.urn(NoteKey::Urn)?,
            title: record.string(NoteKey::Title)?,
            body: record.string(NoteKey::Body),
            date: record.date(NoteKey::Date)?,
            edited_at: record.date(NoteKey::EditedAt),
            rating: record.double(NoteKey::Rating),
            pinned: record.bool(NoteKey::Pinned).unwrap_or(false),
            view_count: record.int(NoteKey::ViewCount).unwrap_or(0),
            priority: record.int16(NoteKey::Priority).unwrap_or(0),
            status: record
                .string_representable(NoteKey::Status)
                .unwrap_or_default(),
            attachment: record.blob(NoteKey::Attachment),
            author: record.ulid(NoteKey::Author),
        })
    }

    fn write_record(&self, record: &mut RecordAccessor<'_, Self>) {
        record
            .set_urn(NoteKey::Urn, &self.urn)
            .set_string(NoteKey::Title, &self.title)
            .set_representable(NoteKey::Body, self.body.as_ref())
            .set_date(NoteKey::Date, &self.date)
            .set_representable(NoteKey::EditedAt, self.edited_at)
            .set_representable(NoteKey::Rating, self.rating)
            .set_bool(NoteKey::Pinned, &self.pinned)
            .set_int(NoteKey::ViewCount, &self.view_count)
            .set_int16(NoteKey::Priority, &self.priority)
            .set_string(NoteKey::Status, &self.status)
            .set_representable(NoteKey::Attachment, self.attachment.as_ref())
            .set_representable(NoteKey::Author, self.author);
    }
}

impl Identifiable for Note {
    fn urn(&self) -> &Urn {
        &self.urn
    }
}

///
/// TagKey
/// Deliberately has neither a `urn` nor a `date` field.
///

#[derive(Clone, Copy, Debug, Eq, FieldKey, Hash, PartialEq)]
pub(crate) enum TagKey {
    Id,
    Label,
}

///
/// Tag
///

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Tag {
    pub(crate) id: Urn,
    pub(crate) label: String,
}

impl EntityKind for Tag {
    type Key = TagKey;

    const ENTITY_NAME: &'static str = "Tag";

    fn from_record(record: &RecordReader<'_, Self>) -> Option<Self> {
        Some(Self {
            id: record.urn(TagKey::Id)?,
            label: record.string(TagKey::Label)?,
        })
    }

    fn write_record(&self, record: &mut RecordAccessor<'_, Self>) {
        record
            .set_urn(TagKey::Id, &self.id)
            .set_string(TagKey::Label, &self.label);
    }
}

impl Identifiable for Tag {
    fn urn(&self) -> &Urn {
        &self.id
    }
}

pub(crate) fn urn(value: &str) -> Urn {
    Urn::parse(value).expect("test urn should parse")
}

/// Schema registering `Note` only.
pub(crate) fn note_schema() -> StoreSchema {
    StoreSchema::new().entity(
        Note::ENTITY_NAME,
        &[
            NoteKey::Urn.string_value(),
            NoteKey::Title.string_value(),
            NoteKey::Date.string_value(),
        ],
    )
}

pub(crate) fn session() -> Session<MemoryStore> {
    Session::new(MemoryStore::new(note_schema()))
}
