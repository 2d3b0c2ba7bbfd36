//! Storage dialects.
//!
//! A [`Dialect`] describes one storage engine: how conversion type names map
//! to column types, how placeholders look, and the templates used to render
//! create-table and insert statements. Supporting another engine means
//! building another `Dialect`, nothing else.

use std::collections::BTreeMap;

/// Create-table template. `{table}` and `{declarations}` are substituted.
pub const DEFAULT_CREATE_TEMPLATE: &str = "CREATE TABLE {table} ({declarations})";

/// Insert template. `{table}`, `{columns}` and `{placeholders}` are substituted.
pub const DEFAULT_INSERT_TEMPLATE: &str = "INSERT INTO {table} ({columns}) VALUES ({placeholders})";

/// Positional placeholder style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
    /// `?, ?, ?`
    QuestionMark,
    /// `$1, $2, $3` (with `prefix = '$'`)
    Numbered { prefix: char },
}

impl Placeholder {
    /// Render the placeholder for a 1-based position.
    pub fn render(&self, position: usize) -> String {
        match self {
            Placeholder::QuestionMark => "?".to_string(),
            Placeholder::Numbered { prefix } => format!("{prefix}{position}"),
        }
    }
}

/// A storage engine description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dialect {
    name: String,
    storage_types: BTreeMap<String, String>,
    placeholder: Placeholder,
    create_template: String,
    insert_template: String,
}

impl Dialect {
    /// A dialect with no type mappings, `?` placeholders and the default
    /// templates.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            storage_types: BTreeMap::new(),
            placeholder: Placeholder::QuestionMark,
            create_template: DEFAULT_CREATE_TEMPLATE.to_string(),
            insert_template: DEFAULT_INSERT_TEMPLATE.to_string(),
        }
    }

    pub fn sqlite() -> Self {
        Self::new("sqlite")
            .map_type("unicode", "TEXT")
            .map_type("str", "TEXT")
            .map_type("int", "INTEGER")
            .map_type("float", "REAL")
    }

    pub fn postgres() -> Self {
        Self::new("postgres")
            .map_type("unicode", "TEXT")
            .map_type("str", "TEXT")
            .map_type("int", "BIGINT")
            .map_type("float", "DOUBLE PRECISION")
            .with_placeholder(Placeholder::Numbered { prefix: '$' })
    }

    /// Look up a built-in dialect by name.
    pub fn by_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "sqlite" | "sqlite3" => Some(Self::sqlite()),
            "postgres" | "postgresql" => Some(Self::postgres()),
            _ => None,
        }
    }

    /// Map a conversion type name to a storage type.
    pub fn map_type(mut self, type_name: &str, storage_type: &str) -> Self {
        self.storage_types
            .insert(type_name.to_string(), storage_type.to_string());
        self
    }

    pub fn with_placeholder(mut self, placeholder: Placeholder) -> Self {
        self.placeholder = placeholder;
        self
    }

    pub fn with_create_template(mut self, template: &str) -> Self {
        self.create_template = template.to_string();
        self
    }

    pub fn with_insert_template(mut self, template: &str) -> Self {
        self.insert_template = template.to_string();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn storage_type(&self, type_name: &str) -> Option<&str> {
        self.storage_types.get(type_name).map(String::as_str)
    }

    /// `(type name, storage type)` pairs, sorted by type name.
    pub fn storage_types(&self) -> impl Iterator<Item = (&str, &str)> {
        self.storage_types
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn placeholder(&self) -> Placeholder {
        self.placeholder
    }

    /// Placeholders for `count` parameters, comma-space joined.
    pub fn placeholder_list(&self, count: usize) -> String {
        (1..=count)
            .map(|position| self.placeholder.render(position))
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn render_create(&self, table: &str, declarations: &str) -> String {
        render(
            &self.create_template,
            &[("table", table), ("declarations", declarations)],
        )
    }

    pub fn render_insert(&self, table: &str, columns: &str, placeholders: &str) -> String {
        render(
            &self.insert_template,
            &[
                ("table", table),
                ("columns", columns),
                ("placeholders", placeholders),
            ],
        )
    }
}

/// Single-pass `{name}` substitution. Unknown names are left as written and
/// substituted text is never rescanned.
fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let substitution = after.find('}').and_then(|close| {
            vars.iter()
                .find(|(name, _)| *name == &after[..close])
                .map(|(_, value)| (close, *value))
        });
        match substitution {
            Some((close, value)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}
