//! Built-in sample structures.
//!
//! These mirror the reference designs used while developing the editor: small
//! arithmetic primitives, a latency keeper and a few composite modules that
//! exercise nested instances, bundles and internal nodes.

use crate::structure::{Direction, EndpointRef, Port, SignalType, Structure, StructureError};

/// Names accepted by [`sample`].
pub const SAMPLE_NAMES: &[&str] = &["add_u4_u4_u4", "keeper", "m1", "add_wrapper", "m2", "m3"];

/// Build a sample by name.
pub fn sample(name: &str) -> Option<Result<Structure, StructureError>> {
    let s = match name {
        "add_u4_u4_u4" => add_u4_u4_u4(),
        "keeper" => keeper(SignalType::UInt(4), 1),
        "m1" => m1(),
        "add_wrapper" => add_wrapper(SignalType::Auto, SignalType::Auto),
        "m2" => m2(),
        "m3" => m3(),
        _ => return None,
    };
    Some(s)
}

fn type_tag(t: &SignalType) -> String {
    t.to_string().replace(['[', ']'], "_").trim_end_matches('_').to_string()
}

fn input(s: &mut Structure, name: &str, t: SignalType) -> Result<EndpointRef, StructureError> {
    s.add_port(name, Direction::Input, t)
}

fn output(s: &mut Structure, name: &str) -> Result<EndpointRef, StructureError> {
    s.add_port(name, Direction::Output, SignalType::Auto)
}

/// Two-operand adder primitive: `op1`, `op2` in, `res` out.
pub fn add(t1: SignalType, t2: SignalType) -> Structure {
    let unique = format!("Add_{}_{}", type_tag(&t1), type_tag(&t2));
    let mut s = Structure::named("Add").with_unique_name(unique);
    for (name, direction, signal) in [
        ("op1", Direction::Input, t1),
        ("op2", Direction::Input, t2),
        ("res", Direction::Output, SignalType::Auto),
    ] {
        s.ports.insert(
            name.to_string(),
            Port {
                name: name.to_string(),
                direction,
                signal,
                latency: 0,
            },
        );
    }
    s
}

/// Bundle field extraction primitive: `i` in, `o` out.
pub fn get_attribute(t: SignalType, path: &[&str]) -> Structure {
    let out = t.field(path).cloned().unwrap_or_default();
    let mut s = Structure::named("GetAttribute")
        .with_unique_name(format!("GetAttribute_{}", path.join("_")));
    s.ports.insert(
        "i".into(),
        Port {
            name: "i".into(),
            direction: Direction::Input,
            signal: t,
            latency: 0,
        },
    );
    s.ports.insert(
        "o".into(),
        Port {
            name: "o".into(),
            direction: Direction::Output,
            signal: out,
            latency: 0,
        },
    );
    s
}

/// Three 4-bit operands summed through two chained adders.
pub fn add_u4_u4_u4() -> Result<Structure, StructureError> {
    let mut s = Structure::named("AddU4U4U4").with_unique_name("Add_UInt_4_UInt_4_UInt_4");
    let u4 = SignalType::UInt(4);

    let op1 = input(&mut s, "op1", u4.clone())?;
    let op2 = input(&mut s, "op2", u4.clone())?;
    let op3 = input(&mut s, "op3", u4.clone())?;
    let res = output(&mut s, "res")?;

    s.add_substructure("add_12", add(u4.clone(), u4.clone()))?;
    s.add_substructure("add_123", add(u4.clone(), u4))?;

    s.connect(&op1, &EndpointRef::sub("add_12", "op1"))?;
    s.connect(&op2, &EndpointRef::sub("add_12", "op2"))?;
    s.connect(&EndpointRef::sub("add_12", "res"), &EndpointRef::sub("add_123", "op1"))?;
    s.connect(&op3, &EndpointRef::sub("add_123", "op2"))?;
    s.connect(&EndpointRef::sub("add_123", "res"), &res)?;
    Ok(s)
}

/// A wire from `i` to `o` with `n` cycles of latency on the input.
pub fn keeper(t: SignalType, n: u32) -> Result<Structure, StructureError> {
    let unique = format!("Keeper_{}_{}CLK", t, n);
    let mut s = Structure::named("Keeper").with_unique_name(unique);
    let i = input(&mut s, "i", t)?;
    let o = output(&mut s, "o")?;
    s.connect(&i, &o)?;
    s.set_latency("i", n)?;
    Ok(s)
}

pub fn m1() -> Result<Structure, StructureError> {
    let mut s = Structure::named("m1");
    let u4 = SignalType::UInt(4);

    let t = input(&mut s, "t", u4.clone())?;
    let a = input(&mut s, "a", u4.clone())?;
    let b = input(&mut s, "b", u4.clone())?;
    let c = input(&mut s, "c", u4.clone())?;
    let o = output(&mut s, "o")?;

    s.add_substructure("x", keeper(u4.clone(), 1)?)?;
    s.add_substructure("y", add(u4.clone(), u4))?;
    s.add_substructure("z", add_u4_u4_u4()?)?;

    s.connect(&t, &EndpointRef::sub("x", "i"))?;
    s.connect(&EndpointRef::sub("x", "o"), &EndpointRef::sub("y", "op1"))?;
    s.connect(&a, &EndpointRef::sub("z", "op1"))?;
    s.connect(&b, &EndpointRef::sub("z", "op2"))?;
    s.connect(&c, &EndpointRef::sub("z", "op3"))?;
    s.connect(&EndpointRef::sub("z", "res"), &EndpointRef::sub("y", "op2"))?;
    s.connect(&EndpointRef::sub("y", "res"), &o)?;
    Ok(s)
}

/// Adder wrapped in a structure with its own ports.
pub fn add_wrapper(t1: SignalType, t2: SignalType) -> Result<Structure, StructureError> {
    let mut s = Structure::named("AddWrapper");
    let i1 = input(&mut s, "i1", t1)?;
    let i2 = input(&mut s, "i2", t2)?;
    let o = output(&mut s, "o")?;

    s.add_substructure("adder", add(SignalType::Auto, SignalType::Auto))?;

    s.connect(&i1, &EndpointRef::sub("adder", "op1"))?;
    s.connect(&i2, &EndpointRef::sub("adder", "op2"))?;
    s.connect(&o, &EndpointRef::sub("adder", "res"))?;
    Ok(s)
}

/// Composite of `m1`, an adder wrapper and a bundle field extraction.
pub fn m2() -> Result<Structure, StructureError> {
    let mut s = Structure::named("m2");
    let u4 = SignalType::UInt(4);
    let bundle = SignalType::bundle([
        (
            "xy",
            SignalType::bundle([("x", SignalType::UInt(4)), ("y", SignalType::UInt(5))]),
        ),
        ("z", SignalType::UInt(6)),
    ]);

    let t = input(&mut s, "t", u4.clone())?;
    let a = input(&mut s, "a", u4.clone())?;
    let b = input(&mut s, "b", u4.clone())?;
    let c = input(&mut s, "c", u4)?;
    let x = input(&mut s, "x", SignalType::UInt(8))?;
    let o = output(&mut s, "o")?;
    let bi = input(&mut s, "Bi", bundle.clone())?;
    let bo = output(&mut s, "Bo")?;

    s.add_substructure("u1", m1()?)?;
    s.add_substructure("u2", add_wrapper(SignalType::Auto, SignalType::Auto)?)?;
    s.add_substructure("u3", get_attribute(bundle, &["xy", "y"]))?;

    s.connect(&t, &EndpointRef::sub("u1", "t"))?;
    s.connect(&a, &EndpointRef::sub("u1", "a"))?;
    s.connect(&b, &EndpointRef::sub("u1", "b"))?;
    s.connect(&c, &EndpointRef::sub("u1", "c"))?;
    s.connect(&EndpointRef::sub("u1", "o"), &EndpointRef::sub("u2", "i1"))?;
    s.connect(&x, &EndpointRef::sub("u2", "i2"))?;
    s.connect(&EndpointRef::sub("u2", "o"), &o)?;

    s.connect(&bi, &EndpointRef::sub("u3", "i"))?;
    s.connect(&EndpointRef::sub("u3", "o"), &bo)?;
    s.set_latency("Bi", 2)?;
    Ok(s)
}

/// Three arithmetic instances sharing an input through an internal node.
pub fn m3() -> Result<Structure, StructureError> {
    let mut s = Structure::named("m3");

    let ipq = input(&mut s, "ipq", SignalType::UInt(2))?;
    let ip = input(&mut s, "ip", SignalType::UInt(6))?;
    let iq = input(&mut s, "iq", SignalType::UInt(1))?;
    let ir1 = input(&mut s, "ir1", SignalType::UInt(4))?;
    let ir2 = input(&mut s, "ir2", SignalType::UInt(4))?;
    let qo = output(&mut s, "qo")?;
    let po = output(&mut s, "po")?;
    let ro = output(&mut s, "ro")?;

    s.add_substructure("p", add_wrapper(SignalType::Auto, SignalType::Auto)?)?;
    s.add_substructure("q", add(SignalType::Auto, SignalType::Auto))?;
    s.add_substructure("r", add(SignalType::UInt(4), SignalType::UInt(4)))?;

    let nipq = s.add_node("Nipq", SignalType::Auto)?;
    s.connect(&ipq, &nipq)?;

    s.connect(&nipq, &EndpointRef::sub("p", "i1"))?;
    s.connect(&ip, &EndpointRef::sub("p", "i2"))?;
    s.connect(&EndpointRef::sub("p", "o"), &po)?;

    s.connect(&iq, &EndpointRef::sub("q", "op1"))?;
    s.connect(&nipq, &EndpointRef::sub("q", "op2"))?;
    s.connect(&EndpointRef::sub("q", "res"), &qo)?;

    s.connect(&ir1, &EndpointRef::sub("r", "op1"))?;
    s.connect(&ir2, &EndpointRef::sub("r", "op2"))?;
    s.connect(&EndpointRef::sub("r", "res"), &ro)?;
    Ok(s)
}
