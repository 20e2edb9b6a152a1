use std::path::Path;

use polars::prelude::*;
use tracing::{info, warn};

use crate::errors::DatasetError;

pub(crate) const DEFAULT_TYPE_COLUMN: &str = "tipoPropiedad";
pub(crate) const DEFAULT_URL_COLUMN: &str = "urlCorrectaPropiedad";

/// Which rows of the export to turn into listing URLs.
#[derive(Debug, Clone)]
pub(crate) struct UrlQuery {
    pub(crate) base_url: String,
    pub(crate) property_type: String,
    /// Half-open `[start, limit)` over the filtered rows.
    pub(crate) start: usize,
    pub(crate) limit: usize,
    pub(crate) type_column: String,
    pub(crate) url_column: String,
}

impl UrlQuery {
    pub(crate) fn new(base_url: &str, property_type: &str, start: usize, limit: usize) -> Self {
        UrlQuery {
            base_url: base_url.to_string(),
            property_type: property_type.to_string(),
            start,
            limit,
            type_column: DEFAULT_TYPE_COLUMN.to_string(),
            url_column: DEFAULT_URL_COLUMN.to_string(),
        }
    }
}

/// Loads the CSV at `csv_path` and builds the ordered URL list for `query`.
///
/// Rows are kept in file order with no deduplication. An empty or inverted
/// range gives an empty list.
pub(crate) fn build_url_list(csv_path: &Path, query: &UrlQuery) -> Result<Vec<String>, DatasetError> {
    // Every column as text so the type filter never hits an inferred number
    let data = CsvReader::from_path(csv_path)?
        .has_header(true)
        .infer_schema(Some(0))
        .finish()?;
    info!("Dataset loaded, shape: {:?}", data.shape());

    select_urls(data, query)
}

fn select_urls(data: DataFrame, query: &UrlQuery) -> Result<Vec<String>, DatasetError> {
    for column in [&query.type_column, &query.url_column] {
        if !data.get_column_names().contains(&column.as_str()) {
            return Err(DatasetError::MissingColumn(column.clone()));
        }
    }

    let offset = i64::try_from(query.start).unwrap_or(i64::MAX);
    let len = IdxSize::try_from(query.limit.saturating_sub(query.start)).unwrap_or(IdxSize::MAX);

    let subset = data
        .lazy()
        .filter(col(&query.type_column).eq(lit(query.property_type.as_str())))
        .slice(offset, len)
        .collect()?;

    let urls = subset
        .column(&query.url_column)?
        .utf8()?
        .into_iter()
        .enumerate()
        .filter_map(|(i, path)| match path {
            Some(path) if !path.is_empty() => Some(format!("{}{}", query.base_url, path)),
            _ => {
                warn!("Row {} of the selection has no URL, skipping", query.start + i);
                None
            }
        })
        .collect::<Vec<String>>();

    info!(
        "Selected {} '{}' URLs in [{}, {})",
        urls.len(),
        query.property_type,
        query.start,
        query.limit
    );
    Ok(urls)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const BASE: &str = "https://century21mexico.com";

    fn csv(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    fn mixed_dataset() -> NamedTempFile {
        csv("id,tipoPropiedad,urlCorrectaPropiedad\n\
             1,terreno,/propiedad/1\n\
             2,casa,/propiedad/2\n\
             3,terreno,/propiedad/3\n\
             4,departamento,/propiedad/4\n\
             5,terreno,/propiedad/5\n\
             6,terreno,/propiedad/6\n\
             7,casa,/propiedad/7\n\
             8,terreno,/propiedad/8\n")
    }

    #[test]
    fn filters_by_type_in_file_order() {
        let file = mixed_dataset();
        let urls = build_url_list(file.path(), &UrlQuery::new(BASE, "terreno", 0, 10)).unwrap();

        assert_eq!(
            urls,
            vec![
                "https://century21mexico.com/propiedad/1",
                "https://century21mexico.com/propiedad/3",
                "https://century21mexico.com/propiedad/5",
                "https://century21mexico.com/propiedad/6",
                "https://century21mexico.com/propiedad/8",
            ]
        );
    }

    #[test]
    fn slices_after_filtering() {
        let file = mixed_dataset();
        let urls = build_url_list(file.path(), &UrlQuery::new(BASE, "terreno", 1, 3)).unwrap();

        assert_eq!(
            urls,
            vec![
                "https://century21mexico.com/propiedad/3",
                "https://century21mexico.com/propiedad/5",
            ]
        );
    }

    #[test]
    fn five_matching_rows_give_five_urls() {
        let file = csv("tipoPropiedad,urlCorrectaPropiedad\n\
                        terreno,/a\nterreno,/b\nterreno,/c\nterreno,/d\nterreno,/e\n");
        let urls = build_url_list(file.path(), &UrlQuery::new(BASE, "terreno", 0, 5)).unwrap();
        assert_eq!(urls.len(), 5);
    }

    #[test]
    fn equal_bounds_give_an_empty_list() {
        let file = mixed_dataset();
        let urls = build_url_list(file.path(), &UrlQuery::new(BASE, "terreno", 2, 2)).unwrap();
        assert!(urls.is_empty());
    }

    #[test]
    fn inverted_or_out_of_range_bounds_give_an_empty_list() {
        let file = mixed_dataset();
        assert!(build_url_list(file.path(), &UrlQuery::new(BASE, "terreno", 4, 1))
            .unwrap()
            .is_empty());
        assert!(build_url_list(file.path(), &UrlQuery::new(BASE, "terreno", 50, 60))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn duplicates_are_kept() {
        let file = csv("tipoPropiedad,urlCorrectaPropiedad\nterreno,/x\nterreno,/x\n");
        let urls = build_url_list(file.path(), &UrlQuery::new(BASE, "terreno", 0, 5)).unwrap();
        assert_eq!(urls, vec![format!("{BASE}/x"), format!("{BASE}/x")]);
    }

    #[test]
    fn rows_without_a_url_are_skipped() {
        let file = csv("tipoPropiedad,urlCorrectaPropiedad\n\
                        terreno,/a\n\
                        terreno,\n\
                        terreno,/c\n");
        let urls = build_url_list(file.path(), &UrlQuery::new(BASE, "terreno", 0, 3)).unwrap();
        assert_eq!(urls, vec![format!("{BASE}/a"), format!("{BASE}/c")]);
    }

    #[test]
    fn missing_column_is_reported() {
        let file = csv("tipo,url\nterreno,/x\n");
        let err = build_url_list(file.path(), &UrlQuery::new(BASE, "terreno", 0, 5)).unwrap_err();
        assert!(matches!(err, DatasetError::MissingColumn(column) if column == DEFAULT_TYPE_COLUMN));
    }

    #[test]
    fn custom_column_names() {
        let file = csv("kind,path\nlote,/l/1\ncasa,/c/1\n");
        let mut query = UrlQuery::new(BASE, "lote", 0, 5);
        query.type_column = "kind".to_string();
        query.url_column = "path".to_string();

        let urls = build_url_list(file.path(), &query).unwrap();
        assert_eq!(urls, vec![format!("{BASE}/l/1")]);
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.csv");
        assert!(build_url_list(&missing, &UrlQuery::new(BASE, "terreno", 0, 5)).is_err());
    }
}
