use crate::{
    db::{
        query::{Predicate, Query},
        response::PageRequest,
    },
    error::Error,
    model::{KeyspaceModel, Schema},
};

///
/// QueryPlan
///
/// A query checked against the schema: every leaf names a field with the
/// matching kind of index, so execution never falls back to a scan.
///

#[derive(Debug)]
pub(crate) struct QueryPlan<'a> {
    pub(crate) model: &'a KeyspaceModel,
    pub(crate) predicate: Option<&'a Predicate>,
    pub(crate) page: Option<PageRequest>,
}

impl QueryPlan<'_> {
    /// Render a compact description for debug logging.
    pub(crate) fn summary(&self) -> String {
        match self.predicate {
            None => "member scan".to_string(),
            Some(predicate) => summarize(predicate),
        }
    }
}

/// Validate `query` against `schema`.
pub(crate) fn plan<'a>(schema: &'a Schema, query: &'a Query) -> Result<QueryPlan<'a>, Error> {
    let model = schema
        .keyspace(&query.keyspace)
        .ok_or_else(|| Error::UnknownKeyspace(query.keyspace.clone()))?;

    if let Some(page) = query.page
        && page.size == 0
    {
        return Err(Error::unsupported_query(
            &query.keyspace,
            "page size must be greater than zero",
        ));
    }

    if let Some(predicate) = &query.predicate {
        validate(model, predicate)?;
    }

    Ok(QueryPlan {
        model,
        predicate: query.predicate.as_ref(),
        page: query.page,
    })
}

fn validate(model: &KeyspaceModel, predicate: &Predicate) -> Result<(), Error> {
    let keyspace = model.name.as_str();

    match predicate {
        Predicate::Eq { field, value } => {
            if model.is_geo_indexed(field) {
                return Err(Error::unsupported_query(
                    keyspace,
                    format!("field '{field}' is geo-indexed; use a near predicate"),
                ));
            }
            if !model.is_indexed(field) {
                return Err(Error::unsupported_query(
                    keyspace,
                    format!("field '{field}' is not indexed"),
                ));
            }
            if value.index_token().is_none() {
                return Err(Error::unsupported_query(
                    keyspace,
                    format!("field '{field}' cannot be matched against {value:?}"),
                ));
            }
        }
        Predicate::Near {
            field,
            center,
            distance,
        } => {
            if !model.is_geo_indexed(field) {
                return Err(Error::unsupported_query(
                    keyspace,
                    format!("field '{field}' is not geo-indexed"),
                ));
            }
            center.validate()?;
            if !distance.is_valid() {
                return Err(Error::unsupported_query(
                    keyspace,
                    format!("invalid distance {distance}"),
                ));
            }
        }
        Predicate::And(children) | Predicate::Or(children) => {
            for child in children {
                validate(model, child)?;
            }
        }
    }

    Ok(())
}

fn summarize(predicate: &Predicate) -> String {
    match predicate {
        Predicate::Eq { field, .. } => format!("equality lookup ({field})"),
        Predicate::Near {
            field, distance, ..
        } => format!("radius lookup ({field}, {distance})"),
        Predicate::And(children) => format!("intersection of {} lookups", children.len()),
        Predicate::Or(children) => format!("union of {} lookups", children.len()),
    }
}
