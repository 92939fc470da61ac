//! Renderer-independent report structure

/// A report: a title followed by sections in reading order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReportDocument {
    /// Title band text
    pub title: String,
    /// Body sections
    pub sections: Vec<Section>,
}

/// One block of report content
#[derive(Debug, Clone, PartialEq)]
pub enum Section {
    /// Section title
    Heading(String),
    /// Label/value lines
    KeyValues(Vec<(String, String)>),
    /// Encoded chart image; `description` names it in the embedding-failure notice
    Chart {
        /// PNG (or any format the `image` crate decodes)
        image: Vec<u8>,
        /// Short name such as `chart`
        description: String,
    },
    /// Plain paragraph
    Notice(String),
    /// Tabular breakdown
    Table(Table),
    /// Vertical gap in millimetres
    Spacer(f32),
}

/// Table column: header text and share of the content width
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    /// Header text
    pub header: String,
    /// Fraction of the content width
    pub width: f32,
}

impl Column {
    /// Create a column
    pub fn new(header: impl Into<String>, width: f32) -> Self {
        Self {
            header: header.into(),
            width,
        }
    }
}

/// Rows of text cells under a header row
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    /// Columns, left to right
    pub columns: Vec<Column>,
    /// Cells per row, one per column
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Empty table with the given columns
    pub fn new(columns: Vec<Column>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Append a row
    pub fn push_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    /// Whether the table has no data rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl ReportDocument {
    /// Document with a title and no sections
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            sections: Vec::new(),
        }
    }

    /// Append a section
    pub fn push(&mut self, section: Section) -> &mut Self {
        self.sections.push(section);
        self
    }

    /// Append a table, or `empty_notice` when it has no rows
    pub fn push_table_or_notice(&mut self, table: Table, empty_notice: &str) -> &mut Self {
        if table.is_empty() {
            self.push(Section::Notice(empty_notice.to_string()))
        } else {
            self.push(Section::Table(table))
        }
    }

    /// Text of every heading, in order
    pub fn headings(&self) -> Vec<&str> {
        self.sections
            .iter()
            .filter_map(|section| match section {
                Section::Heading(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Value of the first key/value line labelled `key`
    pub fn value_of(&self, key: &str) -> Option<&str> {
        self.sections
            .iter()
            .filter_map(|section| match section {
                Section::KeyValues(pairs) => Some(pairs),
                _ => None,
            })
            .flatten()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// The first table, if any
    pub fn table(&self) -> Option<&Table> {
        self.sections.iter().find_map(|section| match section {
            Section::Table(table) => Some(table),
            _ => None,
        })
    }

    /// Every notice paragraph
    pub fn notices(&self) -> Vec<&str> {
        self.sections
            .iter()
            .filter_map(|section| match section {
                Section::Notice(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_table_becomes_notice() {
        let mut doc = ReportDocument::new("T");
        doc.push_table_or_notice(Table::new(vec![Column::new("A", 1.0)]), "Nothing here.");
        assert_eq!(doc.table(), None);
        assert_eq!(doc.notices(), vec!["Nothing here."]);
    }

    #[test]
    fn test_lookups() {
        let mut table = Table::new(vec![Column::new("A", 1.0)]);
        table.push_row(vec!["x".to_string()]);

        let mut doc = ReportDocument::new("T");
        doc.push(Section::Heading("Numbers".to_string()))
            .push(Section::KeyValues(vec![("Peak".to_string(), "9".to_string())]))
            .push_table_or_notice(table, "unused");

        assert_eq!(doc.headings(), vec!["Numbers"]);
        assert_eq!(doc.value_of("Peak"), Some("9"));
        assert_eq!(doc.value_of("Missing"), None);
        assert_eq!(doc.table().map(|t| t.rows.len()), Some(1));
        assert!(doc.notices().is_empty());
    }
}
