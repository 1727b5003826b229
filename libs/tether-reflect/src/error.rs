/// Invalid field table, found while mapping a record's fields.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MappingError {
    #[error("{record}: field `{field}` needs a `name`, `skip` or `embed` tag")]
    Untagged { record: &'static str, field: String },

    #[error("{record}: field `{field}` has an empty attribute name")]
    EmptyName { record: &'static str, field: String },

    #[error("{record}: attribute `{name}` is declared by both `{first}` and `{second}`")]
    DuplicateName {
        record: &'static str,
        name: String,
        first: String,
        second: String,
    },

    #[error("{record}: field `{field}` embeds deeper than {limit} levels")]
    EmbedDepth {
        record: &'static str,
        field: String,
        limit: usize,
    },
}
