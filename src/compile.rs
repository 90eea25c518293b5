//! Parameter compiler: from an ordered declaration list to named,
//! help-annotated flag specifications.
//!
//! Output order is declaration order, and that is a hard invariant: the
//! binder matches positional tokens by position, so reordering would change
//! behavior, not just presentation.

use serde::Serialize;

use crate::decl::{Decl, DeclaredDefault, Value};
use crate::errors::{CompileError, ResolveError};
use crate::resolve::{self, FlagSpec};

// ------------------------------ Parameters -------------------------------- //

/// A declared parameter: name, annotation, optional default.
///
/// The annotation may be a bare descriptor or a `(descriptor, description)`
/// pair; [`compile`] splits the two.
#[derive(Debug, Clone)]
pub struct Parameter {
    name: String,
    annotation: Decl,
    default: DeclaredDefault,
    // Number of times a default was supplied. More than once is a
    // declaration bug surfaced as `DuplicateDefaultError`.
    default_sets: u8,
}

impl Parameter {
    pub fn new(name: impl Into<String>, annotation: impl Into<Decl>) -> Self {
        Parameter {
            name: name.into(),
            annotation: annotation.into(),
            default: DeclaredDefault::Absent,
            default_sets: 0,
        }
    }

    /// Declare with a description attached, going through the same
    /// `(descriptor, description)` pairing the raw grammar uses.
    pub fn described(
        name: impl Into<String>,
        annotation: impl Into<Decl>,
        description: impl Into<String>,
    ) -> Self {
        let pair = Decl::Tuple(vec![annotation.into(), Decl::Literal(description.into())]);
        Parameter::new(name, pair)
    }

    /// Supply a concrete default: the flag becomes `--name` and optional.
    pub fn with_default(mut self, value: Value) -> Self {
        self.default = DeclaredDefault::Value(value);
        self.default_sets += 1;
        self
    }

    /// Supply the null sentinel: the flag becomes `--name` but stays
    /// required, for defaults that must be computed by the caller.
    pub fn with_null_default(mut self) -> Self {
        self.default = DeclaredDefault::Null;
        self.default_sets += 1;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// One compiled flag, ready for registration with a token parser.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompiledFlag {
    /// The parameter name, used as the binding key.
    pub name: String,
    /// `--name` when a default was declared, the bare name otherwise.
    pub external_name: String,
    /// Whether the token parser must see this flag. Presence flags are
    /// never required; a null-sentinel default keeps a named flag required.
    pub required: bool,
    pub spec: FlagSpec,
    /// Pure projection of spec + description + default; regenerate, never
    /// hand-edit.
    pub help: String,
    pub default: DeclaredDefault,
}

impl CompiledFlag {
    /// True when the flag is supplied as `--name value...` rather than by
    /// position.
    pub fn is_named(&self) -> bool {
        self.external_name.starts_with("--")
    }
}

// ------------------------------ Compilation ------------------------------- //

/// Compile an ordered parameter list. Any failure aborts the whole
/// compilation; no partial flag set is ever returned.
pub fn compile(params: &[Parameter]) -> Result<Vec<CompiledFlag>, CompileError> {
    params.iter().map(compile_one).collect()
}

fn compile_one(param: &Parameter) -> Result<CompiledFlag, CompileError> {
    if param.default_sets > 1 {
        return Err(CompileError::DuplicateDefault {
            name: param.name.clone(),
        });
    }
    let at = |source: ResolveError| CompileError::Resolve {
        name: param.name.clone(),
        source,
    };

    let (descriptor, description) = split_description(&param.annotation).map_err(at)?;
    let spec = resolve::resolve(descriptor, &param.default).map_err(at)?;

    let external_name = if param.default.is_present() {
        format!("--{}", param.name)
    } else {
        param.name.clone()
    };
    let required = if spec.polarity.is_some() {
        false
    } else {
        !matches!(param.default, DeclaredDefault::Value(_))
    };
    let help = render_help(description, &spec, &param.default);

    Ok(CompiledFlag {
        name: param.name.clone(),
        external_name,
        required,
        spec,
        help,
        default: param.default.clone(),
    })
}

/// Split an annotation into descriptor and description.
///
/// A 2-tuple whose second element is a string is a described descriptor,
/// unless its first element is itself such a pair (two descriptions, no
/// way to pick one). A string in any other tuple position is ambiguous.
/// Everything else is a bare descriptor with an empty description.
fn split_description(annotation: &Decl) -> Result<(&Decl, &str), ResolveError> {
    if let Decl::Tuple(elems) = annotation {
        if let [head, Decl::Literal(description)] = elems.as_slice() {
            if is_described_pair(head) {
                return Err(ResolveError::AmbiguousAnnotation(annotation.clone()));
            }
            return Ok((head, description.as_str()));
        }
        if elems.iter().any(|e| matches!(e, Decl::Literal(_))) {
            return Err(ResolveError::AmbiguousAnnotation(annotation.clone()));
        }
    }
    Ok((annotation, ""))
}

fn is_described_pair(decl: &Decl) -> bool {
    matches!(decl, Decl::Tuple(elems) if matches!(elems.as_slice(), [_, Decl::Literal(_)]))
}

/// Help segments in fixed order: description, type, action, default. The
/// ordering is load-bearing for golden-output comparisons downstream.
fn render_help(description: &str, spec: &FlagSpec, default: &DeclaredDefault) -> String {
    use std::fmt::Write;

    let mut help = String::from(description);
    if spec.value_type.is_some() {
        let _ = write!(help, " (type: `{}`)", spec.display_type);
    }
    // Choices carry no type segment: the literal set already says
    // everything, and the token parser prints it again on its own.
    if let Some(polarity) = spec.polarity {
        let _ = write!(help, " (action: `{polarity}`)");
    }
    match default {
        DeclaredDefault::Absent => {}
        DeclaredDefault::Null => help.push_str(" (default: `None`)"),
        DeclaredDefault::Value(value) => {
            let _ = write!(help, " (default: `{value}`)");
        }
    }
    help
}

// --------------------------- Grouped targets ------------------------------ //

/// A named entity whose constructor parameters contribute one slice of a
/// combined flag set.
#[derive(Debug, Clone)]
pub struct FlagGroup {
    pub name: String,
    pub doc: String,
    pub params: Vec<Parameter>,
}

impl FlagGroup {
    pub fn new(name: impl Into<String>, doc: impl Into<String>, params: Vec<Parameter>) -> Self {
        FlagGroup {
            name: name.into(),
            doc: doc.into(),
            params,
        }
    }
}

/// Result of compiling several groups into one shared flag set.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupedFlags {
    /// All flags, group by group, declaration order within each group.
    pub flags: Vec<CompiledFlag>,
    /// Per-group parameter names, for slicing bound values back out.
    pub group_names: Vec<(String, Vec<String>)>,
    /// Combined banner listing every contributing entity.
    pub description: String,
}

/// Compile the constructor parameters of several independent entities into
/// one flag set sharing a single binder. Entities stay unaware of each
/// other; a name collision is the caller's problem, as it would be for a
/// hand-written interface.
pub fn compile_groups(groups: &[FlagGroup]) -> Result<GroupedFlags, CompileError> {
    let mut flags = Vec::new();
    let mut group_names = Vec::with_capacity(groups.len());
    let mut description = String::from("Flags are used to initialize the following:");

    for group in groups {
        let compiled = compile(&group.params)?;
        let names = compiled.iter().map(|f| f.name.clone()).collect();
        group_names.push((group.name.clone(), names));
        flags.extend(compiled);
        description.push_str(&format!("\n  {}:\t{}", group.name, group.doc));
    }

    Ok(GroupedFlags {
        flags,
        group_names,
        description,
    })
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decl::Primitive;
    use crate::resolve::{Arity, Polarity, TypeDescriptor};

    fn pair_of_ints() -> TypeDescriptor {
        TypeDescriptor::fixed_tuple(Primitive::Int, 2).unwrap()
    }

    #[test]
    fn described_tuple_with_default_compiles_end_to_end() {
        let bar = Parameter::described("bar", pair_of_ints(), "a pair")
            .with_default(Value::Tuple(vec![Value::Int(40), Value::Int(40)]));
        let flags = compile(&[bar]).unwrap();

        assert_eq!(flags.len(), 1);
        let flag = &flags[0];
        assert_eq!(flag.external_name, "--bar");
        assert!(!flag.required);
        assert_eq!(flag.spec.arity, Some(Arity::Fixed(2)));
        assert_eq!(flag.help, "a pair (type: `(int, int)`) (default: `(40, 40)`)");
    }

    #[test]
    fn choice_without_default_is_positional_and_required() {
        let baz = Parameter::new(
            "baz",
            TypeDescriptor::choice(["a", "b"]).unwrap(),
        );
        let flags = compile(&[baz]).unwrap();

        let flag = &flags[0];
        assert_eq!(flag.external_name, "baz");
        assert!(!flag.is_named());
        assert!(flag.required);
        assert_eq!(
            flag.spec.choices,
            Some(vec!["a".to_string(), "b".to_string()])
        );
        // Choices are self-describing: no type segment in help.
        assert_eq!(flag.help, "");
    }

    #[test]
    fn null_default_names_the_flag_but_keeps_it_required() {
        let p = Parameter::described("dest", Primitive::Str, "output path")
            .with_null_default();
        let flags = compile(&[p]).unwrap();

        let flag = &flags[0];
        assert_eq!(flag.external_name, "--dest");
        assert!(flag.required);
        assert_eq!(
            flag.help,
            "output path (type: `str`) (default: `None`)"
        );
    }

    #[test]
    fn float_defaults_render_as_floats_in_help() {
        let lr = Parameter::described("lr", Primitive::Float, "learning rate")
            .with_default(Value::Float(1.0));
        let flags = compile(&[lr]).unwrap();
        assert_eq!(
            flags[0].help,
            "learning rate (type: `float`) (default: `1.0`)"
        );
    }

    #[test]
    fn boolean_defaults_drive_polarity_and_never_required() {
        let p5 = Parameter::described("p5", Primitive::Bool, "description for p5")
            .with_default(Value::Bool(true));
        let flags = compile(&[p5]).unwrap();

        let flag = &flags[0];
        assert_eq!(flag.external_name, "--p5");
        assert!(!flag.required);
        assert_eq!(flag.spec.polarity, Some(Polarity::SetFalse));
        assert_eq!(
            flag.help,
            "description for p5 (action: `set-false`) (default: `true`)"
        );

        let bare = Parameter::new("verbose", Primitive::Bool);
        let flags = compile(&[bare]).unwrap();
        assert_eq!(flags[0].spec.polarity, Some(Polarity::SetTrue));
        assert!(!flags[0].required);
        assert_eq!(flags[0].help, " (action: `set-true`)");
    }

    #[test]
    fn declaration_order_is_preserved_and_stable() {
        let params = vec![
            Parameter::new("p1", Primitive::Int).with_default(Value::Int(1)),
            Parameter::new("p2", Primitive::Str),
            Parameter::new("p3", Primitive::Float).with_default(Value::Float(0.5)),
        ];
        let once = compile(&params).unwrap();
        let twice = compile(&params).unwrap();

        let names: Vec<&str> = once.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["p1", "p2", "p3"]);
        assert_eq!(once, twice);
    }

    #[test]
    fn resolver_failures_carry_the_parameter_name() {
        let bad = Parameter::new(
            "bad",
            Decl::Tuple(vec![Decl::Type(Primitive::Int), Decl::Type(Primitive::Str)]),
        );
        let err = compile(&[Parameter::new("fine", Primitive::Int), bad]).unwrap_err();
        assert!(matches!(
            err,
            CompileError::Resolve {
                ref name,
                source: ResolveError::HeterogeneousType(_),
            } if name == "bad"
        ));
    }

    #[test]
    fn strings_outside_the_description_slot_are_ambiguous() {
        let mid = Parameter::new(
            "mid",
            Decl::Tuple(vec![
                Decl::Type(Primitive::Int),
                Decl::lit("where am I"),
                Decl::Type(Primitive::Int),
            ]),
        );
        let err = compile(&[mid]).unwrap_err();
        assert!(matches!(
            err,
            CompileError::Resolve {
                source: ResolveError::AmbiguousAnnotation(_),
                ..
            }
        ));

        // A described pair inside a described pair has two descriptions.
        let nested = Parameter::described(
            "nested",
            Decl::Tuple(vec![Decl::Type(Primitive::Int), Decl::lit("inner")]),
            "outer",
        );
        let err = compile(&[nested]).unwrap_err();
        assert!(matches!(
            err,
            CompileError::Resolve {
                source: ResolveError::AmbiguousAnnotation(_),
                ..
            }
        ));
    }

    #[test]
    fn tuples_of_type_tags_are_never_mistaken_for_described_pairs() {
        let p = Parameter::new("pair", pair_of_ints());
        let flags = compile(&[p]).unwrap();
        assert_eq!(flags[0].spec.arity, Some(Arity::Fixed(2)));
        assert_eq!(flags[0].help, " (type: `(int, int)`)");
    }

    #[test]
    fn duplicate_defaults_are_rejected() {
        let p = Parameter::new("twice", Primitive::Int)
            .with_default(Value::Int(1))
            .with_default(Value::Int(2));
        let err = compile(&[p]).unwrap_err();
        assert_eq!(
            err,
            CompileError::DuplicateDefault {
                name: "twice".to_string()
            }
        );

        let p = Parameter::new("mixed", Primitive::Int)
            .with_default(Value::Int(1))
            .with_null_default();
        assert!(matches!(
            compile(&[p]).unwrap_err(),
            CompileError::DuplicateDefault { .. }
        ));
    }

    #[test]
    fn groups_compile_entity_by_entity_into_one_set() {
        let trainer = FlagGroup::new(
            "Trainer",
            "training loop settings",
            vec![
                Parameter::new("epochs", Primitive::Int),
                Parameter::new("lr", Primitive::Float).with_default(Value::Float(0.01)),
            ],
        );
        let model = FlagGroup::new(
            "Model",
            "model topology",
            vec![Parameter::new("layers", Primitive::Int)],
        );

        let grouped = compile_groups(&[trainer, model]).unwrap();
        let names: Vec<&str> = grouped.flags.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["epochs", "lr", "layers"]);
        assert_eq!(
            grouped.group_names,
            vec![
                (
                    "Trainer".to_string(),
                    vec!["epochs".to_string(), "lr".to_string()]
                ),
                ("Model".to_string(), vec!["layers".to_string()]),
            ]
        );
        assert_eq!(
            grouped.description,
            "Flags are used to initialize the following:\n  Trainer:\ttraining loop settings\n  Model:\tmodel topology"
        );
    }

    #[test]
    fn group_failures_abort_the_whole_compilation() {
        let good = FlagGroup::new("Good", "", vec![Parameter::new("x", Primitive::Int)]);
        let bad = FlagGroup::new(
            "Bad",
            "",
            vec![Parameter::new("y", Decl::List(vec![]))],
        );
        let err = compile_groups(&[good, bad]).unwrap_err();
        assert!(matches!(
            err,
            CompileError::Resolve {
                ref name,
                source: ResolveError::EmptyCollection,
            } if name == "y"
        ));
    }
}
