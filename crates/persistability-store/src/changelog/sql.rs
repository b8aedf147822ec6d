//! SQL generation for declarative changes (SQLite dialect)

use crate::changelog::format::{Change, ColumnDef, ColumnEntry};

/// Render a change into the statements that apply it
///
/// Returns a reason string on invalid input; the caller attaches the
/// changelog resource and changeset.
pub fn render(change: &Change) -> Result<Vec<String>, String> {
    match change {
        Change::CreateTable(c) => {
            identifier(&c.table_name)?;
            if c.columns.is_empty() {
                return Err(format!("createTable {} has no columns", c.table_name));
            }
            let columns = c
                .columns
                .iter()
                .map(|entry| column_definition(&entry.column))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(vec![format!(
                "CREATE TABLE {} ({})",
                c.table_name,
                columns.join(", ")
            )])
        }
        Change::AddColumn(c) => {
            identifier(&c.table_name)?;
            if c.columns.is_empty() {
                return Err(format!("addColumn on {} has no columns", c.table_name));
            }
            // SQLite adds one column per ALTER TABLE
            c.columns
                .iter()
                .map(|entry| {
                    column_definition(&entry.column)
                        .map(|def| format!("ALTER TABLE {} ADD COLUMN {}", c.table_name, def))
                })
                .collect()
        }
        Change::CreateIndex(c) => {
            identifier(&c.index_name)?;
            identifier(&c.table_name)?;
            let columns = index_columns(&c.columns)?;
            Ok(vec![format!(
                "CREATE {}INDEX {} ON {} ({})",
                if c.unique { "UNIQUE " } else { "" },
                c.index_name,
                c.table_name,
                columns.join(", ")
            )])
        }
        Change::DropTable(c) => {
            identifier(&c.table_name)?;
            Ok(vec![format!("DROP TABLE {}", c.table_name)])
        }
        Change::Sql(c) => {
            if c.sql.trim().is_empty() {
                return Err("sql change is empty".to_string());
            }
            Ok(vec![c.sql.clone()])
        }
    }
}

fn column_definition(column: &ColumnDef) -> Result<String, String> {
    identifier(&column.name)?;
    let column_type = column
        .column_type
        .as_deref()
        .ok_or_else(|| format!("column {} has no type", column.name))?;
    type_name(column_type)?;

    let mut def = format!("{} {}", column.name, column_type);
    let constraints = column.constraints.clone().unwrap_or_default();

    if constraints.primary_key {
        def.push_str(" PRIMARY KEY");
        if column.auto_increment {
            def.push_str(" AUTOINCREMENT");
        }
    } else if column.auto_increment {
        return Err(format!(
            "column {} is autoIncrement but not a primary key",
            column.name
        ));
    }
    if constraints.nullable == Some(false) {
        def.push_str(" NOT NULL");
    }
    if constraints.unique {
        def.push_str(" UNIQUE");
    }
    if let Some(default) = &column.default_value {
        def.push_str(&format!(" DEFAULT {}", default));
    }
    if let Some(references) = &constraints.references {
        let (table, target) = parse_reference(references)?;
        if let Some(name) = &constraints.foreign_key_name {
            identifier(name)?;
            def.push_str(&format!(" CONSTRAINT {}", name));
        }
        def.push_str(&format!(" REFERENCES {}({})", table, target));
    }
    Ok(def)
}

fn index_columns(columns: &[ColumnEntry]) -> Result<Vec<String>, String> {
    if columns.is_empty() {
        return Err("createIndex has no columns".to_string());
    }
    columns
        .iter()
        .map(|entry| identifier(&entry.column.name).map(|_| entry.column.name.clone()))
        .collect()
}

/// Split `table(column)` into its parts
fn parse_reference(reference: &str) -> Result<(&str, &str), String> {
    let invalid = || format!("reference {} is not of the form table(column)", reference);
    let (table, rest) = reference.split_once('(').ok_or_else(invalid)?;
    let column = rest.strip_suffix(')').ok_or_else(invalid)?;
    let (table, column) = (table.trim(), column.trim());
    identifier(table)?;
    identifier(column)?;
    Ok((table, column))
}

fn identifier(name: &str) -> Result<(), String> {
    let mut chars = name.chars();
    let valid = matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(format!("invalid identifier {:?}", name))
    }
}

fn type_name(column_type: &str) -> Result<(), String> {
    let valid = !column_type.trim().is_empty()
        && column_type
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, ' ' | '(' | ')' | ',' | '_'));
    if valid {
        Ok(())
    } else {
        Err(format!("invalid column type {:?}", column_type))
    }
}
