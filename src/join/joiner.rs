//! The left-to-right document fold.

use super::{
    dedup, rename, CollisionSite, CollisionStrategy, JoinResult, JoinWarning, JoinerConfig,
};
use crate::constants;
use crate::error::Error;
use crate::model::{Document, OASVersion};
use crate::parser::{ParseResult, Parser};
use crate::refs::{self, ComponentBucket};
use indexmap::IndexMap;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use tracing::debug;

type JsonMap = serde_json::Map<String, Value>;

/// Reusable configured joiner.
#[derive(Debug, Clone, Default)]
pub struct Joiner {
    config: JoinerConfig,
}

impl Joiner {
    #[must_use]
    pub const fn new(config: JoinerConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub const fn config(&self) -> &JoinerConfig {
        &self.config
    }

    /// Join documents read from files.
    ///
    /// # Errors
    ///
    /// See [`Joiner::join`], plus I/O and parse errors per input.
    pub fn join_files(&self, paths: &[PathBuf]) -> Result<JoinResult, Error> {
        let parser = Parser::new();
        let inputs = paths
            .iter()
            .map(|path| parser.parse_file(path))
            .collect::<Result<Vec<_>, _>>()?;
        self.join(&inputs)
    }

    /// Fold the parsed inputs left-to-right into one document.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when `inputs` is empty, a version
    /// mismatch error when inputs span major versions, and a collision
    /// error when a collision resolves to a fatal strategy.
    pub fn join(&self, inputs: &[ParseResult]) -> Result<JoinResult, Error> {
        let Some(first) = inputs.first() else {
            return Err(Error::invalid_config("join requires at least one document"));
        };
        let version = first.oas_version;
        for input in inputs {
            if input.oas_version.major() != version.major() {
                return Err(Error::version_mismatch(
                    version.as_str(),
                    input.oas_version.as_str(),
                ));
            }
        }

        let mut state = JoinState {
            version,
            collision_count: 0,
            warnings: Vec::new(),
            owners: HashMap::new(),
        };

        let mut out = first.data.clone();
        if self.config.always_apply_prefix {
            self.apply_prefix(&mut out, first, &mut state)?;
        }
        state.record_owners(&out, &first.source_stem());

        for (index, input) in inputs.iter().enumerate().skip(1) {
            let mut incoming = input.data.clone();
            if self.config.always_apply_prefix {
                self.apply_prefix(&mut incoming, input, &mut state)?;
            }
            self.merge_document(&mut out, incoming, index, input, &mut state)?;
        }

        if self.config.semantic_deduplication {
            for merge in dedup::semantic_deduplicate(&mut out, version) {
                state.warn(JoinWarning {
                    bucket: "semantic-deduplication".to_string(),
                    key: merge.removed.clone(),
                    kept_source: None,
                    incoming_source: None,
                    strategy: None,
                    message: format!(
                        "semantic deduplication merged '{}' into '{}'",
                        merge.removed, merge.canonical
                    ),
                });
            }
        }

        let document: Document = if version.is_v2() {
            Document::V2(
                serde_json::from_value(out.clone()).map_err(|e| Error::structural(e.to_string()))?,
            )
        } else {
            Document::V3(
                serde_json::from_value(out.clone()).map_err(|e| Error::structural(e.to_string()))?,
            )
        };
        let stats = crate::parser::compute_stats(&document);
        debug!(
            inputs = inputs.len(),
            collisions = state.collision_count,
            paths = stats.path_count,
            "joined documents"
        );

        let warning_messages = state.warnings.iter().map(JoinWarning::render).collect();
        Ok(JoinResult {
            document,
            data: out,
            version,
            source_format: first.source_format,
            stats,
            collision_count: state.collision_count,
            warnings: state.warnings,
            warning_messages,
        })
    }

    fn buckets(&self, version: OASVersion) -> Vec<ComponentBucket> {
        ComponentBucket::ALL
            .iter()
            .copied()
            .filter(|bucket| version.is_v3() || bucket.v2_field().is_some())
            .collect()
    }

    fn prefix_for<'a>(&'a self, input: &ParseResult) -> Option<&'a str> {
        let by_path = input
            .source_path
            .as_ref()
            .and_then(|path| self.config.namespace_prefix.get(&path.display().to_string()));
        by_path
            .or_else(|| self.config.namespace_prefix.get(&input.source_stem()))
            .map(String::as_str)
    }

    // Up-front prefixing of every component name of one document.
    fn apply_prefix(
        &self,
        tree: &mut Value,
        input: &ParseResult,
        state: &mut JoinState,
    ) -> Result<(), Error> {
        let Some(prefix) = self.prefix_for(input) else {
            return Ok(());
        };
        for bucket in self.buckets(state.version) {
            let Some(map) = bucket_map(tree, state.version, bucket) else {
                continue;
            };
            let renames: IndexMap<String, String> = map
                .keys()
                .filter(|key| !key.starts_with(prefix))
                .map(|key| (key.clone(), format!("{prefix}{key}")))
                .collect();
            if renames.is_empty() {
                continue;
            }
            if let Some(map) = bucket_map_mut(tree, state.version, bucket) {
                rename_keys(map, &renames);
            }
            refs::rewrite_refs(tree, bucket, state.version, &renames);
        }
        Ok(())
    }

    #[allow(clippy::too_many_lines)]
    fn merge_document(
        &self,
        out: &mut Value,
        mut incoming: Value,
        index: usize,
        input: &ParseResult,
        state: &mut JoinState,
    ) -> Result<(), Error> {
        let incoming_stem = input.source_stem();
        let version = state.version;

        // Phase 1: resolve every component collision to a decision.
        let mut decisions: HashMap<(ComponentBucket, String), Decision> = HashMap::new();
        let mut in_renames: HashMap<ComponentBucket, IndexMap<String, String>> = HashMap::new();
        let mut out_renames: HashMap<ComponentBucket, IndexMap<String, String>> = HashMap::new();
        let mut assigned: HashSet<String> = HashSet::new();

        for bucket in self.buckets(version) {
            let Some(incoming_map) = bucket_map(&incoming, version, bucket) else {
                continue;
            };
            let empty = JsonMap::new();
            let out_map = bucket_map(out, version, bucket).unwrap_or(&empty);
            for (key, incoming_value) in incoming_map {
                if !out_map.contains_key(key) {
                    continue;
                }
                let site = if bucket == ComponentBucket::Schemas {
                    CollisionSite::Schemas
                } else {
                    CollisionSite::Components
                };
                let strategy = self.config.effective_strategy(site);
                let kept = state.owner(bucket.as_str(), key);
                state.collision_count += 1;
                match strategy {
                    CollisionStrategy::Fail => {
                        return Err(Error::collision(
                            bucket.as_str(),
                            key,
                            kept,
                            &incoming_stem,
                            strategy.as_str(),
                        ));
                    }
                    CollisionStrategy::FailOnPaths | CollisionStrategy::AcceptLeft => {
                        decisions.insert((bucket, key.clone()), Decision::Skip);
                        state.warn(collision_warning(
                            bucket.as_str(),
                            key,
                            &kept,
                            &incoming_stem,
                            strategy,
                            format!(
                                "kept value from '{kept}'; discarded value from '{incoming_stem}'"
                            ),
                        ));
                    }
                    CollisionStrategy::AcceptRight => {
                        decisions.insert((bucket, key.clone()), Decision::Replace);
                        state.warn(collision_warning(
                            bucket.as_str(),
                            key,
                            &kept,
                            &incoming_stem,
                            strategy,
                            format!(
                                "replaced value from '{kept}' with value from '{incoming_stem}'"
                            ),
                        ));
                    }
                    CollisionStrategy::RenameRight => {
                        let new_name = self.rename_for(
                            key,
                            &incoming_stem,
                            index,
                            input,
                            out_map,
                            incoming_map,
                            &assigned,
                        )?;
                        assigned.insert(new_name.clone());
                        state.warn(collision_warning(
                            bucket.as_str(),
                            key,
                            &kept,
                            &incoming_stem,
                            strategy,
                            format!(
                                "renamed incoming '{key}' from '{incoming_stem}' to '{new_name}'"
                            ),
                        ));
                        in_renames
                            .entry(bucket)
                            .or_default()
                            .insert(key.clone(), new_name);
                    }
                    CollisionStrategy::RenameLeft => {
                        let new_name = self.rename_for(
                            key,
                            &kept,
                            index,
                            input,
                            out_map,
                            incoming_map,
                            &assigned,
                        )?;
                        assigned.insert(new_name.clone());
                        state.warn(collision_warning(
                            bucket.as_str(),
                            key,
                            &kept,
                            &incoming_stem,
                            strategy,
                            format!(
                                "renamed existing '{key}' from '{kept}' to '{new_name}'; \
                                 incoming from '{incoming_stem}' keeps the original name"
                            ),
                        ));
                        out_renames
                            .entry(bucket)
                            .or_default()
                            .insert(key.clone(), new_name);
                    }
                    CollisionStrategy::DeduplicateEquivalent => {
                        let left = &out_map[key];
                        if dedup::equivalent(
                            self.config.equivalence_mode,
                            left,
                            out,
                            incoming_value,
                            &input.data,
                        ) {
                            decisions.insert((bucket, key.clone()), Decision::Skip);
                            state.warn(collision_warning(
                                bucket.as_str(),
                                key,
                                &kept,
                                &incoming_stem,
                                strategy,
                                format!(
                                    "merged structurally equivalent definitions from '{kept}' \
                                     and '{incoming_stem}'"
                                ),
                            ));
                        } else {
                            return Err(Error::collision(
                                bucket.as_str(),
                                key,
                                kept,
                                &incoming_stem,
                                strategy.as_str(),
                            )
                            .with_context(
                                "definitions are not structurally equivalent",
                            ));
                        }
                    }
                }
            }
        }

        // Phase 2: renames on the incumbent side, with reference rewrites.
        for (bucket, renames) in &out_renames {
            if let Some(map) = bucket_map_mut(out, version, *bucket) {
                rename_keys(map, renames);
            }
            refs::rewrite_refs(out, *bucket, version, renames);
            for (old, new) in renames {
                state.move_owner(bucket.as_str(), old, new);
            }
        }

        // Phase 3: renames on the incoming side, with reference rewrites.
        for (bucket, renames) in &in_renames {
            if let Some(map) = bucket_map_mut(&mut incoming, version, *bucket) {
                rename_keys(map, renames);
            }
            refs::rewrite_refs(&mut incoming, *bucket, version, renames);
        }

        // Phase 4: merge component buckets under the recorded decisions.
        for bucket in self.buckets(version) {
            let Some(incoming_map) = bucket_map(&incoming, version, bucket) else {
                continue;
            };
            let entries: Vec<(String, Value)> = incoming_map
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect();
            if entries.is_empty() {
                continue;
            }
            let out_map = ensure_bucket_mut(out, version, bucket);
            for (key, value) in entries {
                match decisions.get(&(bucket, key.clone())) {
                    Some(Decision::Skip) => {}
                    Some(Decision::Replace) | None => {
                        out_map.insert(key.clone(), value);
                        state.set_owner(bucket.as_str(), &key, &incoming_stem);
                    }
                }
            }
        }

        // Phase 5: paths (and webhooks for 3.1+).
        self.merge_path_area(out, &incoming, constants::FIELD_PATHS, &incoming_stem, state)?;
        if version.is_v3() {
            self.merge_path_area(
                out,
                &incoming,
                constants::FIELD_WEBHOOKS,
                &incoming_stem,
                state,
            )?;
        }

        // Phase 6: array merging. Info stays as the first document wrote it.
        if self.config.merge_arrays {
            let fields: &[&str] = if version.is_v2() {
                &[constants::FIELD_SECURITY, constants::FIELD_TAGS]
            } else {
                &[
                    constants::FIELD_SERVERS,
                    constants::FIELD_SECURITY,
                    constants::FIELD_TAGS,
                ]
            };
            for field in fields {
                concat_array_field(out, &incoming, field);
            }
            if self.config.deduplicate_tags {
                dedup_tags(out, &mut state.warnings);
            }
        }

        Ok(())
    }

    fn merge_path_area(
        &self,
        out: &mut Value,
        incoming: &Value,
        area: &str,
        incoming_stem: &str,
        state: &mut JoinState,
    ) -> Result<(), Error> {
        let Some(incoming_paths) = incoming.get(area).and_then(Value::as_object) else {
            return Ok(());
        };
        let entries: Vec<(String, Value)> = incoming_paths
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        if entries.is_empty() {
            return Ok(());
        }
        let out_root = out
            .as_object_mut()
            .ok_or_else(|| Error::structural("joined document root is not a map"))?;
        let out_paths = out_root
            .entry(area.to_string())
            .or_insert_with(|| Value::Object(JsonMap::new()));
        for (template, item) in entries {
            let exists = out_paths
                .as_object()
                .is_some_and(|map| map.contains_key(&template));
            if !exists {
                if let Some(map) = out_paths.as_object_mut() {
                    map.insert(template.clone(), item);
                }
                state.set_owner(area, &template, incoming_stem);
                continue;
            }

            let strategy = self.config.effective_strategy(CollisionSite::Paths);
            let kept = state.owner(area, &template);
            state.collision_count += 1;
            match strategy {
                CollisionStrategy::Fail | CollisionStrategy::FailOnPaths => {
                    return Err(Error::collision(
                        area,
                        &template,
                        kept,
                        incoming_stem,
                        strategy.as_str(),
                    ));
                }
                CollisionStrategy::AcceptLeft => {
                    state.warn(collision_warning(
                        area,
                        &template,
                        &kept,
                        incoming_stem,
                        strategy,
                        format!("kept path from '{kept}'; discarded path from '{incoming_stem}'"),
                    ));
                }
                CollisionStrategy::AcceptRight => {
                    if let Some(map) = out_paths.as_object_mut() {
                        map.insert(template.clone(), item);
                    }
                    state.set_owner(area, &template, incoming_stem);
                    state.warn(collision_warning(
                        area,
                        &template,
                        &kept,
                        incoming_stem,
                        strategy,
                        format!("replaced path from '{kept}' with path from '{incoming_stem}'"),
                    ));
                }
                CollisionStrategy::RenameLeft | CollisionStrategy::RenameRight => {
                    // Renaming a path template is not well-defined.
                    return Err(Error::collision(
                        area,
                        &template,
                        kept,
                        incoming_stem,
                        strategy.as_str(),
                    )
                    .with_context("path template renames are not supported"));
                }
                CollisionStrategy::DeduplicateEquivalent => {
                    let identical = out_paths
                        .as_object()
                        .and_then(|map| map.get(&template))
                        .is_some_and(|existing| *existing == item);
                    if identical {
                        state.warn(collision_warning(
                            area,
                            &template,
                            &kept,
                            incoming_stem,
                            strategy,
                            format!(
                                "merged identical path declared by '{kept}' and '{incoming_stem}'"
                            ),
                        ));
                    } else {
                        return Err(Error::collision(
                            area,
                            &template,
                            kept,
                            incoming_stem,
                            strategy.as_str(),
                        )
                        .with_context("path items are not identical"));
                    }
                }
            }
        }
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn rename_for(
        &self,
        name: &str,
        source: &str,
        index: usize,
        input: &ParseResult,
        out_map: &JsonMap,
        incoming_map: &JsonMap,
        assigned: &HashSet<String>,
    ) -> Result<String, Error> {
        let base = self.prefix_for(input).map_or_else(
            || {
                rename::render_template(
                    &self.config.rename_template,
                    &rename::RenameContext {
                        name,
                        source,
                        index,
                    },
                )
            },
            |prefix| Ok(format!("{prefix}{name}")),
        )?;
        let taken = |candidate: &str| {
            candidate == name
                || out_map.contains_key(candidate)
                || incoming_map.contains_key(candidate)
                || assigned.contains(candidate)
        };
        if !taken(&base) {
            return Ok(base);
        }
        let mut counter = 2usize;
        loop {
            let candidate = format!("{base}_{counter}");
            if !taken(&candidate) {
                return Ok(candidate);
            }
            counter += 1;
        }
    }
}

enum Decision {
    Skip,
    Replace,
}

struct JoinState {
    version: OASVersion,
    collision_count: usize,
    warnings: Vec<JoinWarning>,
    /// `(area, key)` to the stem of the source that currently owns it.
    owners: HashMap<(String, String), String>,
}

impl JoinState {
    fn warn(&mut self, warning: JoinWarning) {
        self.warnings.push(warning);
    }

    fn owner(&self, area: &str, key: &str) -> String {
        self.owners
            .get(&(area.to_string(), key.to_string()))
            .cloned()
            .unwrap_or_else(|| constants::DEFAULT_SOURCE_STEM.to_string())
    }

    fn set_owner(&mut self, area: &str, key: &str, source: &str) {
        self.owners
            .insert((area.to_string(), key.to_string()), source.to_string());
    }

    fn move_owner(&mut self, area: &str, old: &str, new: &str) {
        if let Some(source) = self
            .owners
            .remove(&(area.to_string(), old.to_string()))
        {
            self.owners
                .insert((area.to_string(), new.to_string()), source);
        }
    }

    fn record_owners(&mut self, tree: &Value, source: &str) {
        let version = self.version;
        let buckets: Vec<ComponentBucket> = ComponentBucket::ALL
            .iter()
            .copied()
            .filter(|bucket| version.is_v3() || bucket.v2_field().is_some())
            .collect();
        for bucket in buckets {
            if let Some(map) = bucket_map(tree, version, bucket) {
                for key in map.keys() {
                    self.set_owner(bucket.as_str(), key, source);
                }
            }
        }
        for area in [constants::FIELD_PATHS, constants::FIELD_WEBHOOKS] {
            if let Some(map) = tree.get(area).and_then(Value::as_object) {
                for key in map.keys() {
                    self.set_owner(area, key, source);
                }
            }
        }
    }
}

fn collision_warning(
    bucket: &str,
    key: &str,
    kept: &str,
    incoming: &str,
    strategy: CollisionStrategy,
    message: String,
) -> JoinWarning {
    JoinWarning {
        bucket: bucket.to_string(),
        key: key.to_string(),
        kept_source: Some(kept.to_string()),
        incoming_source: Some(incoming.to_string()),
        strategy: Some(strategy),
        message: format!("{message} (strategy {strategy})"),
    }
}

fn bucket_map(tree: &Value, version: OASVersion, bucket: ComponentBucket) -> Option<&JsonMap> {
    if version.is_v2() {
        tree.get(bucket.v2_field()?)?.as_object()
    } else {
        tree.get(constants::FIELD_COMPONENTS)?
            .get(bucket.as_str())?
            .as_object()
    }
}

fn bucket_map_mut(
    tree: &mut Value,
    version: OASVersion,
    bucket: ComponentBucket,
) -> Option<&mut JsonMap> {
    if version.is_v2() {
        tree.get_mut(bucket.v2_field()?)?.as_object_mut()
    } else {
        tree.get_mut(constants::FIELD_COMPONENTS)?
            .get_mut(bucket.as_str())?
            .as_object_mut()
    }
}

fn ensure_bucket_mut(
    tree: &mut Value,
    version: OASVersion,
    bucket: ComponentBucket,
) -> &mut JsonMap {
    let root = tree
        .as_object_mut()
        .expect("joined document root is a map");
    let container = if version.is_v2() {
        root
    } else {
        root.entry(constants::FIELD_COMPONENTS.to_string())
            .or_insert_with(|| Value::Object(JsonMap::new()))
            .as_object_mut()
            .expect("components is a map")
    };
    let field = if version.is_v2() {
        bucket.v2_field().expect("bucket exists in 2.0")
    } else {
        bucket.as_str()
    };
    container
        .entry(field.to_string())
        .or_insert_with(|| Value::Object(JsonMap::new()))
        .as_object_mut()
        .expect("bucket is a map")
}

fn rename_keys(map: &mut JsonMap, renames: &IndexMap<String, String>) {
    let entries = std::mem::take(map);
    for (key, value) in entries {
        let new_key = renames.get(&key).cloned().unwrap_or(key);
        map.insert(new_key, value);
    }
}

fn concat_array_field(out: &mut Value, incoming: &Value, field: &str) {
    let Some(incoming_items) = incoming.get(field).and_then(Value::as_array) else {
        return;
    };
    if incoming_items.is_empty() {
        return;
    }
    let Some(root) = out.as_object_mut() else {
        return;
    };
    let entry = root
        .entry(field.to_string())
        .or_insert_with(|| Value::Array(Vec::new()));
    if let Some(items) = entry.as_array_mut() {
        items.extend(incoming_items.iter().cloned());
    }
}

fn dedup_tags(out: &mut Value, _warnings: &mut Vec<JoinWarning>) {
    let Some(tags) = out
        .get_mut(constants::FIELD_TAGS)
        .and_then(Value::as_array_mut)
    else {
        return;
    };
    let mut seen: HashSet<String> = HashSet::new();
    tags.retain(|tag| {
        let Some(name) = tag.get(constants::FIELD_NAME).and_then(Value::as_str) else {
            return true;
        };
        seen.insert(name.to_string())
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::join::EquivalenceMode;
    use crate::parser::parse_str;

    fn billing() -> ParseResult {
        let mut parsed = parse_str(
            r"
openapi: 3.0.3
info: {title: Billing, version: '1.0.0'}
tags:
  - name: billing
paths:
  /invoices:
    get:
      operationId: listInvoices
      responses:
        '200':
          description: ok
          content:
            application/json:
              schema:
                $ref: '#/components/schemas/Account'
components:
  schemas:
    Account:
      type: object
      properties:
        id: {type: integer}
",
        )
        .unwrap();
        parsed.source_path = Some(PathBuf::from("billing.yaml"));
        parsed
    }

    fn crm() -> ParseResult {
        let mut parsed = parse_str(
            r"
openapi: 3.0.3
info: {title: CRM, version: '1.0.0'}
tags:
  - name: crm
  - name: billing
paths:
  /contacts:
    get:
      operationId: listContacts
      responses:
        '200':
          description: ok
          content:
            application/json:
              schema:
                $ref: '#/components/schemas/Account'
components:
  schemas:
    Account:
      type: object
      properties:
        email: {type: string}
",
        )
        .unwrap();
        parsed.source_path = Some(PathBuf::from("crm.yaml"));
        parsed
    }

    #[test]
    fn test_fail_strategy_aborts() {
        let err = Joiner::new(JoinerConfig::new())
            .join(&[billing(), crm()])
            .unwrap_err();
        let text = err.to_string();
        assert!(text.contains("Account"), "message names the key: {text}");
        assert!(text.contains("billing"), "message names the kept source: {text}");
        assert!(text.contains("crm"), "message names the incoming source: {text}");
    }

    #[test]
    fn test_rename_right_rewrites_incoming_refs() {
        let config = JoinerConfig::new()
            .with_schema_strategy(CollisionStrategy::RenameRight)
            .with_default_strategy(CollisionStrategy::AcceptLeft);
        let result = Joiner::new(config).join(&[billing(), crm()]).unwrap();
        assert_eq!(result.collision_count, 1);
        let schemas = result.data["components"]["schemas"].as_object().unwrap();
        assert!(schemas.contains_key("Account"));
        assert!(schemas.contains_key("Account_crm"));
        assert_eq!(
            result.data["paths"]["/contacts"]["get"]["responses"]["200"]["content"]
                ["application/json"]["schema"]["$ref"],
            "#/components/schemas/Account_crm"
        );
        // The incumbent's reference is untouched.
        assert_eq!(
            result.data["paths"]["/invoices"]["get"]["responses"]["200"]["content"]
                ["application/json"]["schema"]["$ref"],
            "#/components/schemas/Account"
        );
    }

    #[test]
    fn test_rename_left_keeps_incoming_name() {
        let config = JoinerConfig::new().with_schema_strategy(CollisionStrategy::RenameLeft);
        let result = Joiner::new(config).join(&[billing(), crm()]).unwrap();
        let schemas = result.data["components"]["schemas"].as_object().unwrap();
        assert!(schemas.contains_key("Account_billing"));
        assert!(schemas.contains_key("Account"));
        assert_eq!(
            result.data["paths"]["/invoices"]["get"]["responses"]["200"]["content"]
                ["application/json"]["schema"]["$ref"],
            "#/components/schemas/Account_billing"
        );
        assert_eq!(
            result.data["paths"]["/contacts"]["get"]["responses"]["200"]["content"]
                ["application/json"]["schema"]["$ref"],
            "#/components/schemas/Account"
        );
    }

    #[test]
    fn test_accept_left_and_right() {
        let left = Joiner::new(
            JoinerConfig::new().with_default_strategy(CollisionStrategy::AcceptLeft),
        )
        .join(&[billing(), crm()])
        .unwrap();
        assert!(left.data["components"]["schemas"]["Account"]["properties"]
            .get("id")
            .is_some());
        assert_eq!(left.collision_count, 1);
        let warning = &left.warnings[0];
        assert_eq!(warning.kept_source.as_deref(), Some("billing"));
        assert_eq!(warning.incoming_source.as_deref(), Some("crm"));

        let right = Joiner::new(
            JoinerConfig::new().with_default_strategy(CollisionStrategy::AcceptRight),
        )
        .join(&[billing(), crm()])
        .unwrap();
        assert!(right.data["components"]["schemas"]["Account"]["properties"]
            .get("email")
            .is_some());
    }

    #[test]
    fn test_tags_concatenated_and_deduplicated() {
        let config = JoinerConfig::new().with_default_strategy(CollisionStrategy::AcceptLeft);
        let result = Joiner::new(config).join(&[billing(), crm()]).unwrap();
        let names: Vec<&str> = result.data["tags"]
            .as_array()
            .unwrap()
            .iter()
            .map(|tag| tag["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, ["billing", "crm"]);
    }

    #[test]
    fn test_version_gating() {
        let v2 = parse_str(r#"{"swagger": "2.0", "info": {"title": "t", "version": "1"}, "paths": {}}"#)
            .unwrap();
        let err = Joiner::new(JoinerConfig::new())
            .join(&[billing(), v2])
            .unwrap_err();
        assert!(err.to_string().contains("version mismatch"));
    }

    #[test]
    fn test_path_rename_is_unsupported() {
        let mut a = billing();
        let mut b = crm();
        a.data["paths"]["/same"] = serde_json::json!({"get": {"responses": {"200": {"description": "a"}}}});
        b.data["paths"]["/same"] = serde_json::json!({"get": {"responses": {"200": {"description": "b"}}}});
        let config = JoinerConfig::new()
            .with_path_strategy(CollisionStrategy::RenameRight)
            .with_schema_strategy(CollisionStrategy::AcceptLeft);
        let err = Joiner::new(config).join(&[a, b]).unwrap_err();
        assert!(err.to_string().contains("not supported"));
    }

    #[test]
    fn test_deduplicate_equivalent_schemas() {
        let mut b = crm();
        // Make crm's Account structurally identical to billing's.
        b.data["components"]["schemas"]["Account"] =
            serde_json::json!({"type": "object", "properties": {"id": {"type": "integer"}}});
        let config = JoinerConfig::new()
            .with_schema_strategy(CollisionStrategy::DeduplicateEquivalent)
            .with_equivalence_mode(EquivalenceMode::Shallow);
        let result = Joiner::new(config).join(&[billing(), b]).unwrap();
        assert_eq!(result.collision_count, 1);
        assert!(result.warnings[0].message.contains("equivalent"));
    }

    #[test]
    fn test_accept_left_is_left_associative() {
        let mut c = crm();
        c.source_path = Some(PathBuf::from("third.yaml"));
        c.data["components"]["schemas"]["Account"] =
            serde_json::json!({"type": "object", "properties": {"third": {"type": "string"}}});

        let config = JoinerConfig::new().with_default_strategy(CollisionStrategy::AcceptLeft);
        let all_at_once = Joiner::new(config.clone())
            .join(&[billing(), crm(), c.clone()])
            .unwrap();

        let pair = Joiner::new(config.clone()).join(&[billing(), crm()]).unwrap();
        let mut intermediate = pair.to_parse_result().unwrap();
        intermediate.source_path = Some(PathBuf::from("intermediate.yaml"));
        let rejoined = Joiner::new(config).join(&[intermediate, c]).unwrap();

        assert_eq!(all_at_once.data, rejoined.data);
    }
}
