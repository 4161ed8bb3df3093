//! Flat CSV rendering of the stored entities.

use std::borrow::Cow;

use crate::domain::{Departement, Ville};

/// A row type with a fixed header.
pub trait CsvRecord {
    const HEADER: &'static [&'static str];

    fn fields(&self) -> Vec<String>;
}

impl CsvRecord for Departement {
    const HEADER: &'static [&'static str] = &["id", "nom"];

    fn fields(&self) -> Vec<String> {
        vec![self.id.to_string(), self.nom.clone()]
    }
}

impl CsvRecord for Ville {
    const HEADER: &'static [&'static str] = &["id", "nom", "nbHabitants"];

    fn fields(&self) -> Vec<String> {
        vec![self.id.to_string(), self.nom.clone(), self.nb_habitants.to_string()]
    }
}

/// Header line followed by one line per record, in the given order.
pub fn to_csv<T: CsvRecord>(records: &[T]) -> String {
    let mut out = String::new();
    push_line(&mut out, T::HEADER.iter().map(|h| Cow::Borrowed(*h)));
    for record in records {
        push_line(&mut out, record.fields().into_iter().map(Cow::Owned));
    }
    out
}

fn push_line<'a>(out: &mut String, fields: impl Iterator<Item = Cow<'a, str>>) {
    for (i, field) in fields.enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push_str(&escape(&field));
    }
    out.push('\n');
}

/// RFC 4180 quoting, only when the field needs it.
fn escape(field: &str) -> Cow<'_, str> {
    if field.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn departement(id: i32, nom: &str) -> Departement {
        Departement { id, nom: nom.into(), code: "00".into(), villes: Vec::new() }
    }

    #[test]
    fn departements_export() {
        let csv = to_csv(&[departement(1, "Nord"), departement(2, "Sud")]);
        assert_eq!(csv, "id,nom\n1,Nord\n2,Sud\n");
    }

    #[test]
    fn villes_export() {
        let villes = [Ville { id: 4, nom: "Lyon".into(), nb_habitants: 500_000, departement_id: None }];
        assert_eq!(to_csv(&villes), "id,nom,nbHabitants\n4,Lyon,500000\n");
    }

    #[test]
    fn empty_export_is_header_only() {
        assert_eq!(to_csv::<Ville>(&[]), "id,nom,nbHabitants\n");
    }

    #[test]
    fn delimiters_in_names_are_quoted() {
        let csv = to_csv(&[departement(3, "Alpes, \"Hautes\"")]);
        assert_eq!(csv, "id,nom\n3,\"Alpes, \"\"Hautes\"\"\"\n");
    }
}
