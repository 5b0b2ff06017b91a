use std::collections::{HashMap, HashSet};

use serde_json::Value;
use tracing::debug;

use crate::error::{EvalError, Result};
use crate::model::{Item, RankedList, value_kind};

/// Ranked results for every (system, query) pair, validated so that all systems
/// answer the same query set. Immutable once built.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultCorpus {
    systems: Vec<String>,
    queries: Vec<String>,
    system_index: HashMap<String, usize>,
    query_index: HashMap<String, usize>,
    // lists[system][query], both in canonical order.
    lists: Vec<Vec<RankedList>>,
}

impl ResultCorpus {
    /// Builds a corpus from `(system, [(query, ranked list)])` pairs.
    ///
    /// System order follows the input. Query order follows `queries` when it is
    /// given and non-empty, otherwise the first system's input order. Every
    /// system must carry exactly that query set.
    pub fn new<I, S, Q, N>(results: I, queries: Option<Vec<String>>) -> Result<Self>
    where
        I: IntoIterator<Item = (S, Q)>,
        S: Into<String>,
        Q: IntoIterator<Item = (N, RankedList)>,
        N: Into<String>,
    {
        let mut systems = Vec::<String>::new();
        let mut per_system = Vec::<Vec<(String, RankedList)>>::new();
        for (system, query_lists) in results {
            let system = system.into();
            if systems.contains(&system) {
                return Err(EvalError::config(format!(
                    "system `{system}` appears more than once"
                )));
            }
            systems.push(system);
            per_system.push(
                query_lists
                    .into_iter()
                    .map(|(query, ranked)| (query.into(), ranked))
                    .collect(),
            );
        }

        if systems.is_empty() {
            debug!("built empty result corpus");
            return Ok(Self::default());
        }

        let queries = match queries {
            Some(queries) if !queries.is_empty() => queries,
            _ => per_system[0]
                .iter()
                .map(|(query, _)| query.clone())
                .collect(),
        };
        let query_set = unique_names(&queries, "query")?;

        let mut lists = Vec::with_capacity(systems.len());
        for (system, query_lists) in systems.iter().zip(per_system) {
            let mut by_query = HashMap::with_capacity(query_lists.len());
            for (query, ranked) in query_lists {
                if by_query.insert(query.clone(), ranked).is_some() {
                    return Err(EvalError::config(format!(
                        "system `{system}` lists query `{query}` more than once"
                    )));
                }
            }

            let system_queries: HashSet<&str> = by_query.keys().map(String::as_str).collect();
            if system_queries != query_set {
                return Err(EvalError::config(format!(
                    "query set of system `{system}` does not match the corpus queries"
                )));
            }

            let mut ordered = Vec::with_capacity(queries.len());
            for query in &queries {
                let ranked = by_query.remove(query).ok_or_else(|| {
                    EvalError::config(format!("system `{system}` is missing query `{query}`"))
                })?;
                ordered.push(ranked);
            }
            lists.push(ordered);
        }

        debug!(
            systems = systems.len(),
            queries = queries.len(),
            "built result corpus"
        );

        Ok(Self {
            system_index: index_names(&systems),
            query_index: index_names(&queries),
            systems,
            queries,
            lists,
        })
    }

    /// Builds a corpus from a JSON document shaped
    /// `{"system": {"query": [{...item...}, ...]}}`.
    pub fn from_json(value: &Value, queries: Option<Vec<String>>) -> Result<Self> {
        let systems = value.as_object().ok_or_else(|| {
            EvalError::type_error(format!(
                "results must be an object keyed by system, found {}",
                value_kind(value)
            ))
        })?;

        let mut parsed = Vec::with_capacity(systems.len());
        for (system, query_value) in systems {
            let query_map = query_value.as_object().ok_or_else(|| {
                EvalError::type_error(format!(
                    "results for system `{system}` must be an object keyed by query, found {}",
                    value_kind(query_value)
                ))
            })?;

            let mut query_lists = Vec::with_capacity(query_map.len());
            for (query, ranked_value) in query_map {
                query_lists.push((query.clone(), parse_ranked_list(system, query, ranked_value)?));
            }
            parsed.push((system.clone(), query_lists));
        }

        Self::new(parsed, queries)
    }

    pub fn systems(&self) -> &[String] {
        &self.systems
    }

    pub fn queries(&self) -> &[String] {
        &self.queries
    }

    pub fn has_system(&self, system: &str) -> bool {
        self.system_index.contains_key(system)
    }

    pub fn has_query(&self, query: &str) -> bool {
        self.query_index.contains_key(query)
    }

    pub fn is_empty(&self) -> bool {
        self.systems.is_empty()
    }

    pub fn ranked_list(&self, system: &str, query: &str) -> Result<&[Item]> {
        let system_pos = self.system_position(system)?;
        let query_pos = self
            .query_index
            .get(query)
            .copied()
            .ok_or_else(|| EvalError::lookup(format!("query `{query}` is not in the corpus")))?;
        Ok(&self.lists[system_pos][query_pos])
    }

    /// Every ranked list of one system, in corpus query order.
    pub fn system_lists(&self, system: &str) -> Result<&[RankedList]> {
        let system_pos = self.system_position(system)?;
        Ok(&self.lists[system_pos])
    }

    /// Every (system, query, ranked list) cell, systems outer and queries inner.
    pub fn cells(&self) -> impl Iterator<Item = (&str, &str, &[Item])> {
        self.systems
            .iter()
            .zip(&self.lists)
            .flat_map(move |(system, lists)| {
                self.queries
                    .iter()
                    .zip(lists)
                    .map(move |(query, ranked)| (system.as_str(), query.as_str(), ranked.as_slice()))
            })
    }

    pub fn items(&self) -> impl Iterator<Item = &Item> {
        self.lists.iter().flatten().flatten()
    }

    fn system_position(&self, system: &str) -> Result<usize> {
        self.system_index
            .get(system)
            .copied()
            .ok_or_else(|| EvalError::lookup(format!("system `{system}` is not in the corpus")))
    }
}

fn parse_ranked_list(system: &str, query: &str, value: &Value) -> Result<RankedList> {
    let entries = value.as_array().ok_or_else(|| {
        EvalError::type_error(format!(
            "results for `{system}` / `{query}` must be an array, found {}",
            value_kind(value)
        ))
    })?;

    entries
        .iter()
        .enumerate()
        .map(|(rank, entry)| {
            entry.as_object().cloned().ok_or_else(|| {
                EvalError::type_error(format!(
                    "item {} for `{system}` / `{query}` must be an object, found {}",
                    rank + 1,
                    value_kind(entry)
                ))
            })
        })
        .collect()
}

fn unique_names<'a>(names: &'a [String], label: &str) -> Result<HashSet<&'a str>> {
    let mut set = HashSet::with_capacity(names.len());
    for name in names {
        if !set.insert(name.as_str()) {
            return Err(EvalError::config(format!(
                "{label} `{name}` is listed more than once"
            )));
        }
    }
    Ok(set)
}

fn index_names(names: &[String]) -> HashMap<String, usize> {
    names
        .iter()
        .enumerate()
        .map(|(position, name)| (name.clone(), position))
        .collect()
}
