use crate::{
    error::{AppError, AppResult},
    services::loader::Catalog,
};

/// Column holding the derived complexity tier in exports
pub const COMPLEXITY_COLUMN: &str = "Complexity";

/// Suggested filename for a full-dataset download
pub const EXPORT_FILENAME: &str = "recipes_full_dataset.csv";

/// Writes the loaded table back out as CSV
///
/// Source columns keep their order and cell text. The derived tier goes in the
/// `Complexity` column, replacing an existing one or appended at the end.
pub fn export_csv(catalog: &Catalog) -> AppResult<Vec<u8>> {
    let headers = catalog.headers();
    let existing = headers.iter().position(|h| h.trim() == COMPLEXITY_COLUMN);

    let mut writer = csv::Writer::from_writer(Vec::new());

    let mut header_row: Vec<&str> = headers.iter().collect();
    if existing.is_none() {
        header_row.push(COMPLEXITY_COLUMN);
    }
    writer.write_record(&header_row).map_err(write_error)?;

    for (record, recipe) in catalog.records().iter().zip(catalog.recipes()) {
        let mut row: Vec<&str> = record.iter().collect();
        match existing {
            Some(i) => row[i] = recipe.complexity.as_str(),
            None => row.push(recipe.complexity.as_str()),
        }
        writer.write_record(&row).map_err(write_error)?;
    }

    writer
        .into_inner()
        .map_err(|e| AppError::Internal(format!("CSV export flush failed: {}", e)))
}

fn write_error(e: csv::Error) -> AppError {
    AppError::Internal(format!("CSV export failed: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::loader::tests::{sample_catalog, SAMPLE_CSV};

    #[test]
    fn test_export_appends_complexity() {
        let bytes = export_csv(&sample_catalog()).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let mut lines = text.lines();

        assert_eq!(
            lines.next().unwrap(),
            "recipe_title,category,cleaned_ingredients_filtered,num_steps,num_ingredients,directions,Complexity"
        );
        assert_eq!(
            lines.next().unwrap(),
            "R1,Dessert,\"egg, flour\",2,2,\"['Whisk egg.', 'Fold in flour.']\",Simple"
        );
        assert_eq!(text.lines().count(), SAMPLE_CSV.lines().count());
    }

    #[test]
    fn test_export_replaces_existing_complexity_column() {
        let csv = "recipe_title,category,num_steps,directions,Complexity\n\
                   A,Soup,1,Stir.,Complex\n\
                   B,Soup,9,Stir.,Simple\n";
        let catalog = Catalog::from_bytes(csv.as_bytes()).unwrap();
        let text = String::from_utf8(export_csv(&catalog).unwrap()).unwrap();

        assert_eq!(
            text,
            "recipe_title,category,num_steps,directions,Complexity\n\
             A,Soup,1,Stir.,Simple\n\
             B,Soup,9,Stir.,Complex\n"
        );
    }

    #[test]
    fn test_export_reloads_to_same_table() {
        let original = sample_catalog();
        let exported = export_csv(&original).unwrap();
        let reloaded = Catalog::from_bytes(&exported).unwrap();

        assert_eq!(reloaded.recipes(), original.recipes());
    }
}
