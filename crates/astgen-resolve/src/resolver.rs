//! Semantic analysis (§4.3): fully-qualified names, shape check, trait
//! expansion, guard synthesis, field 4-tuple resolution, the
//! incompatibility matrix, map/mmap key rewriting and the container/
//! ownership/visitability overrides.

use astgen_parser::model::{Attributes, RawCustomType, RawField, RawFile, RawNode};
use rustc_hash::FxHashMap;

use crate::error::{ResolverError, ResolverErrorKind};
use crate::model::{Access, Container, Enumeration, Field, Model, Node, Ownership, ResolvedFile, Union};

/// The ten mutually-exclusive decoration pairs (invariant 5).
const CONFLICTING_PAIRS: &[(&str, &str)] = &[
    ("optional", "reference"),
    ("optional", "array"),
    ("optional", "darray"),
    ("map", "array"),
    ("map", "darray"),
    ("optional", "map"),
    ("optional", "mmap"),
    ("map", "mmap"),
    ("array", "mmap"),
    ("cowned", "reference"),
];

/// Decoration attribute keys; anything else (`namespace`, `istrait`, ...)
/// doesn't count as a "decoration" for invariant 6's purposes.
const DECORATION_KEYS: &[&str] = &[
    "optional",
    "reference",
    "array",
    "darray",
    "map",
    "mmap",
    "cowned",
    "visitable",
    "notvisitable",
];

/// Run the full resolution pipeline over a parsed file.
pub fn resolve(mut raw: RawFile) -> Result<ResolvedFile, ResolverError> {
    let namespace = raw.options.get("namespace").flatten().map(str::to_string);

    expand_traits(&mut raw)?;

    let node_order: Vec<String> = raw.nodes.iter().map(|n| n.name.clone()).collect();
    check_shape(&raw)?;

    let mut out = ResolvedFile {
        includes: raw.includes.clone(),
        options: raw.options.clone(),
        public_blocks: raw.public_blocks.clone(),
        private_blocks: raw.private_blocks.clone(),
        ..ResolvedFile::default()
    };

    for e in &raw.enums {
        out.enums.insert(
            e.name.clone(),
            Enumeration {
                name: e.name.clone(),
                fqn: qualify(&namespace, &e.name),
                variants: e.variants.clone(),
                span: e.span,
            },
        );
    }
    for t in &raw.types {
        out.types.insert(t.name.clone(), to_resolved_custom_type(t));
    }

    for raw_node in &raw.nodes {
        let node = resolve_node(raw_node, &raw, &namespace)?;
        out.nodes.insert(raw_node.name.clone(), node);
    }

    for raw_union in &raw.unions {
        let mut variants = Vec::with_capacity(raw_union.variants.len());
        for variant in &raw_union.variants {
            let resolved = resolve_node(variant, &raw, &namespace)?;
            for field in &resolved.fields {
                if field.model == Model::Aggr {
                    return Err(ResolverError::new(
                        ResolverErrorKind::UnionOfUnionNotAllowed {
                            union_name: raw_union.name.clone(),
                            field: field.name.clone(),
                        },
                        field.span,
                    ));
                }
            }
            variants.push(resolved);
        }
        out.unions.insert(
            raw_union.name.clone(),
            Union {
                name: raw_union.name.clone(),
                fqn: qualify(&namespace, &raw_union.name),
                variants,
                span: raw_union.span,
            },
        );
    }

    out.declarations = crate::orderer::order(&raw.enums, &out.nodes, &node_order);
    Ok(out)
}

/// §4.3 step 3: copy every `istrait` field/block from a parent into each of
/// its children (marking the copy `wastrait`), then strip `istrait` from
/// the parent. Mutates `raw` in place, before any other resolution step.
fn expand_traits(raw: &mut RawFile) -> Result<(), ResolverError> {
    let parents: Vec<String> = raw
        .nodes
        .iter()
        .filter(|n| !n.children.is_empty())
        .map(|n| n.name.clone())
        .collect();

    for parent_name in parents {
        let (trait_fields, trait_public, trait_private, children) = {
            let parent = raw.node(&parent_name).expect("listed above");
            (
                parent
                    .fields
                    .iter()
                    .filter(|f| f.attributes.contains("istrait"))
                    .cloned()
                    .collect::<Vec<_>>(),
                parent
                    .public_blocks
                    .iter()
                    .filter(|b| b.attributes.contains("istrait"))
                    .cloned()
                    .collect::<Vec<_>>(),
                parent
                    .private_blocks
                    .iter()
                    .filter(|b| b.attributes.contains("istrait"))
                    .cloned()
                    .collect::<Vec<_>>(),
                parent.children.clone(),
            )
        };

        for child_name in &children {
            for field in &trait_fields {
                let child = raw.node(child_name).expect("declared during parse");
                if child.has_field(&field.name) {
                    return Err(ResolverError::new(
                        ResolverErrorKind::TraitRedefinesField {
                            node: child_name.clone(),
                            field: field.name.clone(),
                        },
                        field.span,
                    ));
                }
                let mut copy = field.clone();
                copy.attributes.remove("istrait");
                copy.attributes.set("wastrait", None);
                raw.node_mut(child_name)
                    .expect("declared during parse")
                    .fields
                    .push(copy);
            }
            for block in &trait_public {
                let mut copy = block.clone();
                copy.attributes.remove("istrait");
                copy.attributes.set("wastrait", None);
                raw.node_mut(child_name)
                    .expect("declared during parse")
                    .public_blocks
                    .push(copy);
            }
            for block in &trait_private {
                let mut copy = block.clone();
                copy.attributes.remove("istrait");
                copy.attributes.set("wastrait", None);
                raw.node_mut(child_name)
                    .expect("declared during parse")
                    .private_blocks
                    .push(copy);
            }
        }

        let parent = raw.node_mut(&parent_name).expect("listed above");
        parent.fields.retain(|f| !f.attributes.contains("istrait"));
        parent
            .public_blocks
            .retain(|b| !b.attributes.contains("istrait"));
        parent
            .private_blocks
            .retain(|b| !b.attributes.contains("istrait"));
    }
    Ok(())
}

/// §4.3 step 2: no node may have both non-empty `parents` and non-empty
/// `children` at once (invariant 3).
fn check_shape(raw: &RawFile) -> Result<(), ResolverError> {
    for node in &raw.nodes {
        if !node.parents.is_empty() && !node.children.is_empty() {
            return Err(ResolverError::new(
                ResolverErrorKind::SubnodeOfSubnode {
                    node: node.name.clone(),
                },
                node.span,
            ));
        }
    }
    Ok(())
}

fn qualify(namespace: &Option<String>, name: &str) -> String {
    match namespace {
        Some(ns) if !ns.is_empty() => format!("{ns}::{name}"),
        _ => name.to_string(),
    }
}

fn to_resolved_custom_type(t: &RawCustomType) -> crate::model::CustomType {
    crate::model::CustomType {
        name: t.name.clone(),
        underlying: t.underlying.clone(),
        default: t.default.clone(),
        span: t.span,
    }
}

/// Resolve one node's (or union variant's) guards and fields; shared by
/// top-level nodes and union variants (§4.3 step 12: "repeat steps 4-10").
fn resolve_node(
    raw_node: &RawNode,
    raw: &RawFile,
    namespace: &Option<String>,
) -> Result<Node, ResolverError> {
    let mut guards: FxHashMap<String, Vec<String>> = FxHashMap::default();
    let mut fields = Vec::with_capacity(raw_node.fields.len());

    for raw_field in &raw_node.fields {
        if let Some(value) = raw_field.attributes.get("cowned") {
            let guard = value
                .filter(|s| !s.is_empty())
                .unwrap_or("_owns_fields")
                .to_string();
            guards
                .entry(guard)
                .or_default()
                .push(raw_field.name.clone());
        }
        fields.push(resolve_field(raw_field, raw, &raw_node.name)?);
    }

    Ok(Node {
        name: raw_node.name.clone(),
        fqn: qualify(namespace, &raw_node.name),
        attributes: raw_node.attributes.clone(),
        parents: raw_node.parents.clone(),
        children: raw_node.children.clone(),
        fields,
        public_blocks: raw_node.public_blocks.clone(),
        private_blocks: raw_node.private_blocks.clone(),
        guards,
        span: raw_node.span,
    })
}

/// §4.3 steps 5-10 for a single field.
fn resolve_field(raw_field: &RawField, raw: &RawFile, owner: &str) -> Result<Field, ResolverError> {
    let (model, resolved_type) = lookup_type(raw, &raw_field.type_name).ok_or_else(|| {
        ResolverError::new(
            ResolverErrorKind::UnknownFieldType {
                type_name: raw_field.type_name.clone(),
            },
            raw_field.span,
        )
    })?;

    if model == Model::Aggr {
        if DECORATION_KEYS
            .iter()
            .any(|k| raw_field.attributes.contains(k))
        {
            return Err(ResolverError::new(
                ResolverErrorKind::AggrFieldCannotBeDecorated {
                    field: raw_field.name.clone(),
                },
                raw_field.span,
            ));
        }
    } else {
        check_decoration_conflicts(raw_field)?;
    }

    let mut attributes = raw_field.attributes.clone();
    if attributes.contains("map") || attributes.contains("mmap") {
        rewrite_map_key(&mut attributes, raw, raw_field)?;
    }

    let (mut ownership, access) = initial_tuple(model, raw, &raw_field.type_name);
    let mut is_visitable = matches!(model, Model::Node | Model::Aggr);

    let container = if attributes.contains("map") {
        Container::Map
    } else if attributes.contains("mmap") {
        Container::MultiMap
    } else if attributes.contains("array") {
        Container::Array
    } else if attributes.contains("darray") {
        Container::DoubleArray
    } else if attributes.contains("optional") {
        ownership = Ownership::Full;
        Container::Optional
    } else {
        Container::Value
    };

    if attributes.contains("reference") {
        ownership = Ownership::Reference;
        is_visitable = false;
    }
    if attributes.contains("cowned") {
        ownership = Ownership::Conditional;
    }
    if attributes.contains("visitable") {
        is_visitable = true;
    }
    if attributes.contains("notvisitable") {
        is_visitable = false;
    }

    Ok(Field {
        name: raw_field.name.clone(),
        display_name: raw_field.name.clone(),
        type_name: raw_field.type_name.clone(),
        attributes,
        default: raw_field.default.clone(),
        model,
        ownership,
        access,
        container,
        is_visitable,
        resolved_type,
        owning_node: owner.to_string(),
        span: raw_field.span,
    })
}

fn lookup_type(raw: &RawFile, type_name: &str) -> Option<(Model, String)> {
    if raw.nodes.iter().any(|n| n.name == type_name) {
        return Some((Model::Node, type_name.to_string()));
    }
    if raw.enums.iter().any(|e| e.name == type_name) {
        return Some((Model::Enum, type_name.to_string()));
    }
    if raw.types.iter().any(|t| t.name == type_name) {
        return Some((Model::Type, type_name.to_string()));
    }
    if raw.unions.iter().any(|u| u.name == type_name) {
        return Some((Model::Aggr, type_name.to_string()));
    }
    None
}

/// Table 1: the initial `(ownership, access)` pair for a field's model,
/// before any decoration overrides are applied. `container` always starts
/// as `Value` and `is_visitable` is derived separately by the caller.
fn initial_tuple(model: Model, raw: &RawFile, type_name: &str) -> (Ownership, Access) {
    match model {
        Model::Node => (Ownership::Full, Access::Pointer),
        Model::Enum => (Ownership::Full, Access::Object),
        Model::Type => {
            let is_pointer = raw
                .types
                .iter()
                .find(|t| t.name == type_name)
                .map(|t| t.is_pointer())
                .unwrap_or(false);
            if is_pointer {
                (Ownership::Full, Access::Pointer)
            } else {
                (Ownership::Full, Access::Object)
            }
        }
        Model::Aggr => (Ownership::Full, Access::Object),
    }
}

fn check_decoration_conflicts(field: &RawField) -> Result<(), ResolverError> {
    for (a, b) in CONFLICTING_PAIRS {
        if field.attributes.contains(a) && field.attributes.contains(b) {
            return Err(ResolverError::new(
                ResolverErrorKind::DecorationConflict {
                    field: field.name.clone(),
                    first: (*a).to_string(),
                    second: (*b).to_string(),
                },
                field.span,
            ));
        }
    }
    Ok(())
}

/// §4.3 step 7: a `map`/`mmap` key attribute's value must name a declared
/// custom type; its value is rewritten to that type's underlying spelling.
fn rewrite_map_key(
    attributes: &mut Attributes,
    raw: &RawFile,
    field: &RawField,
) -> Result<(), ResolverError> {
    let key_attr = if attributes.contains("map") { "map" } else { "mmap" };
    let key_name = attributes
        .get(key_attr)
        .flatten()
        .unwrap_or_default()
        .to_string();
    let underlying = raw
        .types
        .iter()
        .find(|t| t.name == key_name)
        .map(|t| t.underlying.clone())
        .ok_or_else(|| {
            ResolverError::new(
                ResolverErrorKind::MapKeyMustBeCustomType {
                    field: field.name.clone(),
                    key: key_name.clone(),
                },
                field.span,
            )
        })?;
    attributes.set(key_attr, Some(underlying));
    Ok(())
}

