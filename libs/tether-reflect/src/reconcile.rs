use std::collections::BTreeSet;

/// What the record's names are being compared against. Only affects wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Counterpart {
    /// An object value (decode).
    Object,
    /// An attribute type directory (encode).
    Attributes,
}

impl Counterpart {
    fn noun(self) -> &'static str {
        match self {
            Counterpart::Object => "object",
            Counterpart::Attributes => "attributes",
        }
    }

    fn subject(self) -> &'static str {
        match self {
            Counterpart::Object => "Object defines",
            Counterpart::Attributes => "Attributes define",
        }
    }
}

/// Names present on only one side. At least one list is non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mismatch {
    /// In the record, absent from the object. Sorted.
    pub record_only: Vec<String>,
    /// In the object, absent from the record. Sorted.
    pub object_only: Vec<String>,
}

impl Mismatch {
    pub fn message(&self, counterpart: Counterpart) -> String {
        let noun = counterpart.noun();
        let mut parts = Vec::new();
        if !self.record_only.is_empty() {
            parts.push(format!(
                "Struct defines fields not found in {noun}: {}.",
                self.record_only.join(", ")
            ));
        }
        if !self.object_only.is_empty() {
            parts.push(format!(
                "{} fields not found in struct: {}.",
                counterpart.subject(),
                self.object_only.join(", ")
            ));
        }
        format!("mismatch between struct and {noun}: {}", parts.join(" "))
    }
}

/// Require the two name sets to be identical.
pub fn reconcile<'r, 'o, R, O>(record: R, object: O) -> Result<(), Mismatch>
where
    R: IntoIterator<Item = &'r str>,
    O: IntoIterator<Item = &'o str>,
{
    let record: BTreeSet<&str> = record.into_iter().collect();
    let object: BTreeSet<&str> = object.into_iter().collect();

    let record_only: Vec<String> = record.difference(&object).map(|s| s.to_string()).collect();
    let object_only: Vec<String> = object.difference(&record).map(|s| s.to_string()).collect();

    if record_only.is_empty() && object_only.is_empty() {
        Ok(())
    } else {
        Err(Mismatch {
            record_only,
            object_only,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    #[test]
    fn identical_sets_match_regardless_of_order() {
        assert_eq!(reconcile(["b", "a"], ["a", "b"]), Ok(()));
        assert_eq!(reconcile([], []), Ok(()));
    }

    #[test]
    fn static_names_reconcile_against_borrowed_keys() {
        let record: [&'static str; 2] = ["age", "name"];
        let object: BTreeMap<String, bool> =
            BTreeMap::from([("name".to_string(), true), ("age".to_string(), false)]);
        assert_eq!(reconcile(record, object.keys().map(String::as_str)), Ok(()));
    }

    #[test]
    fn reports_both_directions_sorted() {
        let mismatch =
            reconcile(["name", "zeta", "extra"], ["name", "other", "alpha"]).unwrap_err();
        assert_eq!(mismatch.record_only, vec!["extra", "zeta"]);
        assert_eq!(mismatch.object_only, vec!["alpha", "other"]);
        assert_eq!(
            mismatch.message(Counterpart::Object),
            "mismatch between struct and object: \
             Struct defines fields not found in object: extra, zeta. \
             Object defines fields not found in struct: alpha, other."
        );
    }

    #[test]
    fn one_sided_mismatch_mentions_only_that_side() {
        let mismatch = reconcile(["name"], ["name", "y"]).unwrap_err();
        assert_eq!(
            mismatch.message(Counterpart::Attributes),
            "mismatch between struct and attributes: \
             Attributes define fields not found in struct: y."
        );
    }
}
