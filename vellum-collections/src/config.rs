use std::fmt;
use std::sync::Arc;

use vellum_data::{build_version_collection_fields, Field, FieldSchema, VersionsConfig};

use crate::access::AccessRule;
use crate::hooks::{AfterOperationHook, BeforeOperationHook, CollectionHooks};

/// Access rules per capability. `None` falls back to the default rule
/// (an authenticated identity is required).
#[derive(Clone, Default)]
pub struct CollectionAccess {
    pub read: Option<AccessRule>,
    pub read_versions: Option<AccessRule>,
}

impl fmt::Debug for CollectionAccess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollectionAccess")
            .field("read", &self.read.is_some())
            .field("read_versions", &self.read_versions.is_some())
            .finish()
    }
}

/// Static configuration of a collection.
///
/// ```ignore
/// let posts = CollectionConfig::new("posts")
///     .fields(vec![Field::text("title"), Field::relationship("owner")])
///     .versions(VersionsConfig::with_drafts(true))
///     .read_versions(own_versions)
///     .before_operation(hooks::before_operation(|args| async move { Ok(None) }))
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct CollectionConfig {
    pub slug: String,
    pub fields: Vec<Field>,
    /// Adds `createdAt` / `updatedAt` date fields.
    pub timestamps: bool,
    pub versions: Option<VersionsConfig>,
    pub access: CollectionAccess,
    pub hooks: CollectionHooks,
}

impl CollectionConfig {
    pub fn new(slug: impl Into<String>) -> Self {
        Self {
            slug: slug.into(),
            fields: Vec::new(),
            timestamps: true,
            versions: None,
            access: CollectionAccess::default(),
            hooks: CollectionHooks::default(),
        }
    }

    pub fn fields(mut self, fields: Vec<Field>) -> Self {
        self.fields = fields;
        self
    }

    pub fn timestamps(mut self, enabled: bool) -> Self {
        self.timestamps = enabled;
        self
    }

    pub fn versions(mut self, versions: VersionsConfig) -> Self {
        self.versions = Some(versions);
        self
    }

    pub fn read(mut self, rule: AccessRule) -> Self {
        self.access.read = Some(rule);
        self
    }

    pub fn read_versions(mut self, rule: AccessRule) -> Self {
        self.access.read_versions = Some(rule);
        self
    }

    pub fn before_operation(mut self, hook: BeforeOperationHook) -> Self {
        self.hooks.before_operation.push(hook);
        self
    }

    pub fn after_operation(mut self, hook: AfterOperationHook) -> Self {
        self.hooks.after_operation.push(hook);
        self
    }

    pub fn build(self) -> Collection {
        Collection::new(self)
    }

    /// Declared fields plus the timestamp fields when enabled.
    pub fn document_fields(&self) -> Vec<Field> {
        let mut fields = self.fields.clone();
        if self.timestamps {
            for name in ["createdAt", "updatedAt"] {
                if !fields.iter().any(|f| f.name == name) {
                    fields.push(Field::date(name));
                }
            }
        }
        fields
    }

    /// Queryable schema of the collection's documents.
    pub fn document_schema(&self) -> FieldSchema {
        FieldSchema::new(self.document_fields())
    }

    /// Queryable schema of the collection's versions.
    pub fn version_schema(&self) -> FieldSchema {
        build_version_collection_fields(
            &self.document_fields(),
            &self.versions.unwrap_or_default(),
        )
    }
}

/// A registered collection. Cheap to clone.
#[derive(Debug, Clone)]
pub struct Collection {
    config: Arc<CollectionConfig>,
}

impl Collection {
    pub fn new(config: CollectionConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &CollectionConfig {
        &self.config
    }

    pub fn slug(&self) -> &str {
        &self.config.slug
    }
}

impl From<CollectionConfig> for Collection {
    fn from(config: CollectionConfig) -> Self {
        Collection::new(config)
    }
}
