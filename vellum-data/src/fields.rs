use std::sync::Arc;

use vellum_core::RequestContext;

/// Storage/query type of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    Id,
    Text,
    Email,
    Textarea,
    Number,
    Checkbox,
    Date,
    Select,
    Relationship,
    /// Free-form JSON; any sub-path below it is queryable.
    Json,
    /// Named container of nested fields.
    Group,
    /// Repeated container of nested fields.
    Array,
}

impl FieldType {
    /// Whether the field holds nested fields addressed with dotted paths.
    pub fn is_container(self) -> bool {
        matches!(self, FieldType::Group | FieldType::Array)
    }
}

/// Field-level read access callback. Returning `false` hides the field
/// (and everything nested below it) from the current identity.
pub type FieldAccess = Arc<dyn Fn(&RequestContext) -> bool + Send + Sync>;

/// A single field in a collection schema.
#[derive(Clone)]
pub struct Field {
    pub name: String,
    pub field_type: FieldType,
    /// Nested fields for groups and arrays.
    pub fields: Vec<Field>,
    pub hidden: bool,
    pub read_access: Option<FieldAccess>,
}

impl Field {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            fields: Vec::new(),
            hidden: false,
            read_access: None,
        }
    }

    pub fn text(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Text)
    }

    pub fn number(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Number)
    }

    pub fn checkbox(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Checkbox)
    }

    pub fn date(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Date)
    }

    pub fn relationship(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Relationship)
    }

    pub fn json(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Json)
    }

    pub fn group(name: impl Into<String>, fields: Vec<Field>) -> Self {
        Self {
            fields,
            ..Self::new(name, FieldType::Group)
        }
    }

    pub fn array(name: impl Into<String>, fields: Vec<Field>) -> Self {
        Self {
            fields,
            ..Self::new(name, FieldType::Array)
        }
    }

    /// Exclude the field from every read and filter.
    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    pub fn read_access<F>(mut self, f: F) -> Self
    where
        F: Fn(&RequestContext) -> bool + Send + Sync + 'static,
    {
        self.read_access = Some(Arc::new(f));
        self
    }

    /// `true` unless a read-access callback denies `ctx`.
    pub fn can_read(&self, ctx: &RequestContext) -> bool {
        self.read_access.as_ref().map_or(true, |access| access(ctx))
    }
}

impl std::fmt::Debug for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.name)
            .field("field_type", &self.field_type)
            .field("fields", &self.fields)
            .field("hidden", &self.hidden)
            .field("read_access", &self.read_access.is_some())
            .finish()
    }
}

/// A filter path resolved against a schema.
#[derive(Debug)]
pub struct ResolvedPath<'a> {
    /// Type of the field the path ends on.
    pub field_type: FieldType,
    /// Every declared field traversed, outermost first. Empty for the implicit `id`.
    pub chain: Vec<&'a Field>,
}

impl ResolvedPath<'_> {
    pub fn is_hidden(&self) -> bool {
        self.chain.iter().any(|f| f.hidden)
    }

    pub fn is_readable(&self, ctx: &RequestContext) -> bool {
        self.chain.iter().all(|f| f.can_read(ctx))
    }
}

/// The queryable field set of a collection (or of its versions).
#[derive(Debug, Clone, Default)]
pub struct FieldSchema {
    fields: Vec<Field>,
}

impl FieldSchema {
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Resolve a dotted path (`version.meta.title`).
    ///
    /// Top-level `id` resolves even when not declared. Segments below a JSON
    /// field are not checked, and numeric segments below an array (row
    /// indexes) are skipped.
    pub fn resolve(&self, path: &str) -> Option<ResolvedPath<'_>> {
        if path.is_empty() {
            return None;
        }

        let mut segments = path.split('.').peekable();
        let mut level = self.fields.as_slice();
        let mut chain: Vec<&Field> = Vec::new();

        while let Some(segment) = segments.next() {
            let Some(field) = level.iter().find(|f| f.name == segment) else {
                if chain.is_empty() && segment == "id" && segments.peek().is_none() {
                    return Some(ResolvedPath {
                        field_type: FieldType::Id,
                        chain,
                    });
                }
                return None;
            };
            chain.push(field);

            match field.field_type {
                FieldType::Json => {
                    return Some(ResolvedPath {
                        field_type: FieldType::Json,
                        chain,
                    })
                }
                FieldType::Array => {
                    if segments
                        .peek()
                        .is_some_and(|next| next.bytes().all(|b| b.is_ascii_digit()))
                    {
                        segments.next();
                    }
                    level = &field.fields;
                }
                FieldType::Group => level = &field.fields,
                _ => {
                    if segments.peek().is_some() {
                        return None;
                    }
                }
            }
        }

        let field_type = chain.last().map(|f| f.field_type)?;
        Some(ResolvedPath { field_type, chain })
    }
}

/// Draft support for versioned collections.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DraftsConfig {
    pub autosave: bool,
}

/// Versioning options of a collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VersionsConfig {
    pub drafts: Option<DraftsConfig>,
}

impl VersionsConfig {
    pub fn with_drafts(autosave: bool) -> Self {
        Self {
            drafts: Some(DraftsConfig { autosave }),
        }
    }
}

/// Field schema of the versions table of a collection.
///
/// The document's own fields are nested under `version`; each row also
/// carries its `parent` document, its timestamps, and the draft markers when
/// drafts are enabled.
pub fn build_version_collection_fields(fields: &[Field], versions: &VersionsConfig) -> FieldSchema {
    let mut version_fields = vec![
        Field::relationship("parent"),
        Field::group("version", fields.to_vec()),
        Field::date("createdAt"),
        Field::date("updatedAt"),
    ];

    if let Some(drafts) = versions.drafts {
        version_fields.push(Field::checkbox("latest"));
        if drafts.autosave {
            version_fields.push(Field::checkbox("autosave"));
        }
    }

    FieldSchema::new(version_fields)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post_fields() -> Vec<Field> {
        vec![
            Field::text("title"),
            Field::number("views"),
            Field::text("secret").hidden(),
            Field::group("meta", vec![Field::text("description")]),
            Field::array("blocks", vec![Field::text("heading")]),
            Field::json("payload"),
        ]
    }

    #[test]
    fn resolves_nested_paths() {
        let schema = FieldSchema::new(post_fields());
        assert_eq!(schema.resolve("title").unwrap().field_type, FieldType::Text);
        assert_eq!(
            schema.resolve("meta.description").unwrap().field_type,
            FieldType::Text
        );
        assert_eq!(
            schema.resolve("blocks.heading").unwrap().field_type,
            FieldType::Text
        );
        assert_eq!(
            schema.resolve("blocks.2.heading").unwrap().field_type,
            FieldType::Text
        );
        assert_eq!(
            schema.resolve("payload.any.depth").unwrap().field_type,
            FieldType::Json
        );
        assert_eq!(schema.resolve("meta").unwrap().field_type, FieldType::Group);
    }

    #[test]
    fn rejects_unknown_paths() {
        let schema = FieldSchema::new(post_fields());
        assert!(schema.resolve("missing").is_none());
        assert!(schema.resolve("title.deeper").is_none());
        assert!(schema.resolve("meta.missing").is_none());
        assert!(schema.resolve("").is_none());
    }

    #[test]
    fn id_is_implicit() {
        let schema = FieldSchema::new(post_fields());
        let resolved = schema.resolve("id").unwrap();
        assert_eq!(resolved.field_type, FieldType::Id);
        assert!(resolved.chain.is_empty());
        assert!(schema.resolve("id.x").is_none());
    }

    #[test]
    fn hidden_propagates_through_chain() {
        let schema = FieldSchema::new(vec![Field::group("private", vec![Field::text("note")]).hidden()]);
        assert!(schema.resolve("private.note").unwrap().is_hidden());
    }

    #[test]
    fn version_fields_without_drafts() {
        let schema = build_version_collection_fields(&post_fields(), &VersionsConfig::default());
        let names: Vec<_> = schema.fields().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["parent", "version", "createdAt", "updatedAt"]);
        assert_eq!(
            schema.resolve("version.title").unwrap().field_type,
            FieldType::Text
        );
        assert!(schema.resolve("title").is_none());
        assert!(schema.resolve("version.secret").unwrap().is_hidden());
    }

    #[test]
    fn version_fields_with_drafts_and_autosave() {
        let drafts = build_version_collection_fields(&post_fields(), &VersionsConfig::with_drafts(false));
        assert!(drafts.resolve("latest").is_some());
        assert!(drafts.resolve("autosave").is_none());

        let autosave = build_version_collection_fields(&post_fields(), &VersionsConfig::with_drafts(true));
        assert_eq!(
            autosave.resolve("autosave").unwrap().field_type,
            FieldType::Checkbox
        );
    }
}
