// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Database dialect services used by generators.
//!
//! The compiler core never inspects SQL it emits; generators ask the dialect
//! for identifier quoting, object names, lock statements and named SQL
//! snippets.
//!
//! # Resources
//!
//! | Key | Placeholders |
//! |-----|--------------|
//! | `CreateSchema` | `{schema}` |
//! | `DropSchema` | `{schema}` |
//! | `CreateTable` | `{object}` |
//! | `DropTable` | `{object}` |
//! | `AddColumn` | `{object}`, `{column}`, `{type}` |
//! | `DropColumn` | `{object}`, `{column}` |
//! | `AddForeignKey` | `{object}`, `{constraint}`, `{column}`, `{target}` |
//! | `DropConstraint` | `{object}`, `{constraint}` |
//! | `CreateUniqueIndex` | `{object}`, `{index}`, `{columns}` |
//! | `DropIndex` | `{schema}`, `{index}` |
//! | `CreateView` | `{object}`, `{body}` |
//! | `DropView` | `{object}` |
//! | `CreateFunction` | `{object}`, `{arguments}`, `{returns}`, `{body}` |
//! | `DropFunction` | `{object}`, `{arguments}` |

/// Identifier and snippet formatting for one SQL dialect.
pub trait SqlDialect: Send + Sync {
    /// Quote a single identifier.
    fn quote_identifier(&self, identifier: &str) -> String;

    /// Fully qualified object name.
    fn object_name(&self, schema: &str, name: &str) -> String {
        format!(
            "{}.{}",
            self.quote_identifier(schema),
            self.quote_identifier(name)
        )
    }

    /// Statement taking an exclusive transaction-scoped lock on the resource
    /// composed of `parts`.
    fn lock_resource(&self, parts: &[&str]) -> String;

    /// [`lock_resource`](Self::lock_resource) narrowed by the run-time value
    /// of the SQL expression `value`, so distinct values do not contend.
    fn lock_resource_for(&self, parts: &[&str], value: &str) -> String;

    /// SQL snippet registered under `key`.
    fn resource(&self, key: &str) -> Option<&'static str>;

    /// [`resource`](Self::resource) with `{name}` placeholders substituted.
    fn render(&self, key: &str, args: &[(&str, &str)]) -> Option<String> {
        let mut text = self.resource(key)?.to_string();
        for (name, value) in args {
            text = text.replace(&format!("{{{name}}}"), value);
        }
        Some(text)
    }
}

/// PostgreSQL.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostgresDialect;

impl SqlDialect for PostgresDialect {
    fn quote_identifier(&self, identifier: &str) -> String {
        format!("\"{}\"", identifier.replace('"', "\"\""))
    }

    fn lock_resource(&self, parts: &[&str]) -> String {
        let resource = parts.join("|").replace('\'', "''");
        format!("PERFORM pg_advisory_xact_lock(hashtext('{resource}'));")
    }

    fn lock_resource_for(&self, parts: &[&str], value: &str) -> String {
        let resource = parts.join("|").replace('\'', "''");
        format!(
            "PERFORM pg_advisory_xact_lock(hashtext('{resource}|' || COALESCE({value}::text, '')));"
        )
    }

    fn resource(&self, key: &str) -> Option<&'static str> {
        let text = match key {
            "CreateSchema" => "CREATE SCHEMA {schema};",
            "DropSchema" => "DROP SCHEMA {schema};",
            "CreateTable" => "CREATE TABLE {object} (\n    \"ID\" uuid PRIMARY KEY\n);",
            "DropTable" => "DROP TABLE {object};",
            "AddColumn" => "ALTER TABLE {object} ADD COLUMN {column} {type};",
            "DropColumn" => "ALTER TABLE {object} DROP COLUMN {column};",
            "AddForeignKey" => {
                "ALTER TABLE {object} ADD CONSTRAINT {constraint} FOREIGN KEY ({column}) REFERENCES {target} (\"ID\");"
            }
            "DropConstraint" => "ALTER TABLE {object} DROP CONSTRAINT {constraint};",
            "CreateUniqueIndex" => "CREATE UNIQUE INDEX {index} ON {object} ({columns});",
            "DropIndex" => "DROP INDEX {schema}.{index};",
            "CreateView" => "CREATE VIEW {object} AS\n{body};",
            "DropView" => "DROP VIEW {object};",
            "CreateFunction" => {
                "CREATE FUNCTION {object}({arguments}) RETURNS {returns} AS $$\n{body}\n$$ LANGUAGE sql;"
            }
            "DropFunction" => "DROP FUNCTION {object}({arguments});",
            _ => return None
        };
        Some(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quotes_identifiers() {
        let dialect = PostgresDialect;
        assert_eq!(dialect.quote_identifier("Invoice"), "\"Invoice\"");
        assert_eq!(dialect.quote_identifier("a\"b"), "\"a\"\"b\"");
        assert_eq!(dialect.object_name("Demo", "Invoice"), "\"Demo\".\"Invoice\"");
    }

    #[test]
    fn lock_uses_advisory_transaction_lock() {
        let lock = PostgresDialect.lock_resource(&["Demo.Invoice", "Code"]);
        assert_eq!(
            lock,
            "PERFORM pg_advisory_xact_lock(hashtext('Demo.Invoice|Code'));"
        );
    }

    #[test]
    fn keyed_lock_appends_the_runtime_value() {
        let lock = PostgresDialect.lock_resource_for(&["Demo.Invoice", "Code"], "NEW.\"Region\"");
        assert_eq!(
            lock,
            "PERFORM pg_advisory_xact_lock(hashtext('Demo.Invoice|Code|' || COALESCE(NEW.\"Region\"::text, '')));"
        );
    }

    #[test]
    fn renders_resources() {
        let sql = PostgresDialect
            .render("DropColumn", &[("object", "\"Demo\".\"Invoice\""), ("column", "\"Code\"")])
            .unwrap();
        assert_eq!(sql, "ALTER TABLE \"Demo\".\"Invoice\" DROP COLUMN \"Code\";");
        assert!(PostgresDialect.resource("Unknown").is_none());
    }
}
