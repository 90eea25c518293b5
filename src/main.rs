//! Demo binary: a `main` whose flag interface is derived from its declared
//! parameter list instead of being written by hand.
//!
//! Try `flagforge-demo --help`, or `--dump-flags` for the compiled
//! specifications as JSON.

use anyhow::Result;

use flagforge::{Parameter, Primitive, TypeDescriptor, Value, bind, compile};

fn parameters() -> Result<Vec<Parameter>> {
    Ok(vec![
        Parameter::described("p1", Primitive::Int, "description for p1"),
        Parameter::new("p2", TypeDescriptor::ZeroOrMore(Primitive::Float)),
        Parameter::new(
            "p3",
            TypeDescriptor::choice(["hearts", "spades", "clubs", "diamonds"])?,
        )
        .with_default(Value::str("diamonds")),
        Parameter::described(
            "p4",
            TypeDescriptor::fixed_tuple(Primitive::Int, 2)?,
            "description for p4",
        )
        .with_default(Value::Tuple(vec![Value::Int(3), Value::Int(2)])),
        Parameter::described("p5", Primitive::Bool, "description for p5")
            .with_default(Value::Bool(true)),
    ])
}

fn main() -> Result<()> {
    let flags = compile(&parameters()?)?;

    // debug path: show the compiled flag set instead of parsing
    if std::env::args().any(|arg| arg == "--dump-flags") {
        println!("{}", serde_json::to_string_pretty(&flags)?);
        return Ok(());
    }

    let matches = bind::to_command("flagforge-demo", "This is main.", &flags).get_matches();
    let values = bind::bind_matches(&flags, &matches);
    for (name, value) in &values {
        println!("{name} = {value}");
    }
    Ok(())
}
