//! Thin orchestration: register compiled flags with `clap` and read parsed
//! tokens back as an ordered name-to-value map.
//!
//! Arity enforcement, value coercion and choice membership are clap's job;
//! this module only translates [`CompiledFlag`]s into `Arg`s and walks the
//! matches afterwards.

use clap::builder::PossibleValuesParser;
use clap::{Arg, ArgAction, ArgMatches, Command, value_parser};
use indexmap::IndexMap;

use crate::compile::CompiledFlag;
use crate::decl::{DeclaredDefault, Primitive, Value};
use crate::resolve::{Arity, Polarity};

/// Build a command with one argument per compiled flag, in order.
pub fn to_command(name: &'static str, about: impl Into<String>, flags: &[CompiledFlag]) -> Command {
    let mut cmd = Command::new(name).about(about.into());
    for flag in flags {
        cmd = cmd.arg(to_arg(flag));
    }
    cmd
}

fn to_arg(flag: &CompiledFlag) -> Arg {
    let mut arg = Arg::new(flag.name.clone()).help(flag.help.clone());

    if let Some(polarity) = flag.spec.polarity {
        // Presence flags are always registered as long flags; a value-less
        // positional cannot be matched by position.
        return arg.long(flag.name.clone()).action(match polarity {
            Polarity::SetTrue => ArgAction::SetTrue,
            Polarity::SetFalse => ArgAction::SetFalse,
        });
    }

    if flag.is_named() {
        arg = arg.long(flag.name.clone()).required(flag.required);
    } else {
        arg = arg.required(flag.required);
    }

    match flag.spec.arity {
        Some(Arity::One) | None => {}
        Some(Arity::Fixed(n)) => arg = arg.num_args(n),
        Some(Arity::OneOrMore) => arg = arg.num_args(1..),
        Some(Arity::ZeroOrMore) => {
            arg = arg.num_args(0..).required(false);
        }
    }

    if let Some(choices) = &flag.spec.choices {
        arg = arg.value_parser(PossibleValuesParser::new(choices.clone()));
    } else if let Some(ty) = flag.spec.value_type {
        arg = match ty {
            Primitive::Int => arg.value_parser(value_parser!(i64)),
            Primitive::Float => arg.value_parser(value_parser!(f64)),
            Primitive::Str => arg.value_parser(value_parser!(String)),
            Primitive::Bool => arg.value_parser(value_parser!(bool)),
        };
    }

    arg
}

/// Walk the matches and bind every flag's value back to its parameter
/// name, preserving declaration order. Omitted optional flags fall back to
/// their declared defaults; an omitted zero-or-more flag binds an empty
/// list.
pub fn bind_matches(flags: &[CompiledFlag], matches: &ArgMatches) -> IndexMap<String, Value> {
    let mut bound = IndexMap::with_capacity(flags.len());

    for flag in flags {
        if flag.spec.polarity.is_some() {
            bound.insert(flag.name.clone(), Value::Bool(matches.get_flag(&flag.name)));
            continue;
        }

        let parsed = if flag.spec.choices.is_some() {
            matches
                .get_one::<String>(&flag.name)
                .map(|s| Value::Str(s.clone()))
        } else {
            match (flag.spec.arity, flag.spec.value_type) {
                (Some(Arity::One) | None, Some(ty)) => scalar_value(matches, &flag.name, ty),
                (Some(Arity::Fixed(_)), Some(ty)) => {
                    many_values(matches, &flag.name, ty).map(Value::Tuple)
                }
                (Some(Arity::OneOrMore | Arity::ZeroOrMore), Some(ty)) => {
                    many_values(matches, &flag.name, ty).map(Value::List)
                }
                _ => None,
            }
        };

        match parsed {
            Some(value) => {
                bound.insert(flag.name.clone(), value);
            }
            None => match &flag.default {
                DeclaredDefault::Value(value) => {
                    bound.insert(flag.name.clone(), value.clone());
                }
                DeclaredDefault::Absent | DeclaredDefault::Null => {
                    if flag.spec.arity == Some(Arity::ZeroOrMore) {
                        bound.insert(flag.name.clone(), Value::List(vec![]));
                    }
                    // Otherwise the flag was required and clap already
                    // refused the command line; nothing to bind.
                }
            },
        }
    }

    bound
}

fn scalar_value(matches: &ArgMatches, name: &str, ty: Primitive) -> Option<Value> {
    match ty {
        Primitive::Int => matches.get_one::<i64>(name).map(|v| Value::Int(*v)),
        Primitive::Float => matches.get_one::<f64>(name).map(|v| Value::Float(*v)),
        Primitive::Str => matches.get_one::<String>(name).map(|v| Value::Str(v.clone())),
        Primitive::Bool => matches.get_one::<bool>(name).map(|v| Value::Bool(*v)),
    }
}

fn many_values(matches: &ArgMatches, name: &str, ty: Primitive) -> Option<Vec<Value>> {
    match ty {
        Primitive::Int => matches
            .get_many::<i64>(name)
            .map(|vs| vs.map(|v| Value::Int(*v)).collect()),
        Primitive::Float => matches
            .get_many::<f64>(name)
            .map(|vs| vs.map(|v| Value::Float(*v)).collect()),
        Primitive::Str => matches
            .get_many::<String>(name)
            .map(|vs| vs.map(|v| Value::Str(v.clone())).collect()),
        Primitive::Bool => matches
            .get_many::<bool>(name)
            .map(|vs| vs.map(|v| Value::Bool(*v)).collect()),
    }
}

// ------------------------------- Tests ------------------------------------ //
