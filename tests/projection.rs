use nodal_editor::canvas::{Canvas, Column, DrawOp, NodeId, PinId, PinKind, RecordingCanvas};
use nodal_editor::graph::{InstanceInfo, NetInfo, PortInfo, StructureGraph};
use nodal_editor::projection::{FrameReport, NodeOwner, ProjectionPass};
use nodal_editor::samples;
use nodal_editor::structure::{Direction, EndpointRef, SignalType, Structure};

/// Hand-written graph that records every connect request.
#[derive(Default)]
struct FakeGraph {
    ports: Vec<(String, Direction)>,
    instances: Vec<(String, Vec<(String, Direction)>)>,
    nets: Vec<NetInfo>,
    connects: Vec<(EndpointRef, EndpointRef)>,
    refuse: bool,
}

impl StructureGraph for FakeGraph {
    type Error = String;

    fn visible_ports(&self) -> Vec<PortInfo<'_>> {
        self.ports
            .iter()
            .map(|(name, direction)| PortInfo {
                name: name.as_str(),
                direction: *direction,
                type_name: "Bit".to_string(),
            })
            .collect()
    }

    fn instances(&self) -> Vec<InstanceInfo<'_>> {
        self.instances
            .iter()
            .map(|(name, ports)| InstanceInfo {
                name: name.as_str(),
                type_name: "Leaf",
                ports: ports
                    .iter()
                    .map(|(p, d)| PortInfo {
                        name: p.as_str(),
                        direction: *d,
                        type_name: "Bit".to_string(),
                    })
                    .collect(),
            })
            .collect()
    }

    fn net_list(&self) -> Vec<NetInfo> {
        self.nets.clone()
    }

    fn connect_endpoints(&mut self, a: &EndpointRef, b: &EndpointRef) -> Result<(), String> {
        self.connects.push((a.clone(), b.clone()));
        if self.refuse {
            Err("refused".to_string())
        } else {
            Ok(())
        }
    }
}

fn wire() -> Structure {
    let mut s = Structure::named("wire");
    let i = s.add_port("i", Direction::Input, SignalType::Bit).unwrap();
    let o = s.add_port("o", Direction::Output, SignalType::Bit).unwrap();
    s.connect(&i, &o).unwrap();
    s
}

fn frame(pass: &mut ProjectionPass, s: &mut Structure, canvas: &mut RecordingCanvas) {
    canvas.begin("test");
    pass.draw(Some(s), canvas);
    canvas.end();
}

#[test]
fn empty_structure_draws_nothing() {
    let mut s = Structure::named("empty");
    let mut pass = ProjectionPass::new();
    let mut canvas = RecordingCanvas::new();
    let report = pass.draw(Some(&mut s), &mut canvas);

    assert_eq!(report.nodes, 0);
    assert_eq!(report.links, 0);
    assert!(canvas.nodes().is_empty());
    assert!(canvas.links().is_empty());
}

#[test]
fn absent_graph_is_skipped() {
    let mut pass = ProjectionPass::new();
    let mut canvas = RecordingCanvas::new();
    canvas.script_link(PinId(1), PinId(2), true);
    let report = pass.draw(None::<&mut Structure>, &mut canvas);

    assert_eq!(report, FrameReport::default());
    assert!(canvas.ops().is_empty());
}

#[test]
fn port_pins_follow_port_direction() {
    let mut s = Structure::named("dirs");
    s.add_port("a", Direction::Input, SignalType::UInt(4)).unwrap();
    s.add_port("y", Direction::Output, SignalType::Bit).unwrap();
    s.add_port("b", Direction::Input, SignalType::Auto).unwrap();

    let mut pass = ProjectionPass::new();
    let mut canvas = RecordingCanvas::new();
    pass.draw(Some(&mut s), &mut canvas);

    let titles: Vec<&str> = canvas.nodes().iter().map(|(_, t)| *t).collect();
    assert_eq!(titles, ["a", "y", "b"]);
    let pins = canvas.pins();
    let kinds: Vec<PinKind> = pins.iter().map(|(_, k, _)| *k).collect();
    assert_eq!(kinds, [PinKind::Input, PinKind::Output, PinKind::Input]);
    // Port pins are labelled with the signal type.
    assert_eq!(pins[0].2, "UInt[4]");
    assert_eq!(pins[1].2, "Bit");
}

#[test]
fn instance_columns_hold_ports_in_declaration_order() {
    let mut inner = Structure::named("Mix");
    inner.add_port("x", Direction::Output, SignalType::Bit).unwrap();
    inner.add_port("a", Direction::Input, SignalType::Bit).unwrap();
    inner.add_port("b", Direction::Input, SignalType::Bit).unwrap();
    inner.add_port("y", Direction::Output, SignalType::Bit).unwrap();
    inner.add_port("c", Direction::Input, SignalType::Bit).unwrap();
    let mut s = Structure::named("top");
    s.add_substructure("u0", inner).unwrap();

    let mut pass = ProjectionPass::new();
    let mut canvas = RecordingCanvas::new();
    pass.draw(Some(&mut s), &mut canvas);

    let nodes = canvas.nodes();
    assert_eq!(nodes.len(), 1);
    let (node, title) = nodes[0];
    assert_eq!(title, "u0: Mix");
    assert_eq!(canvas.column_pins(node, Column::Inputs), ["a", "b", "c"]);
    assert_eq!(canvas.column_pins(node, Column::Outputs), ["x", "y"]);
    for (_, kind, label) in canvas.pins() {
        let expected = if ["a", "b", "c"].contains(&label) {
            PinKind::Input
        } else {
            PinKind::Output
        };
        assert_eq!(kind, expected, "pin {}", label);
    }
}

#[test]
fn instance_with_no_ports_still_opens_both_columns() {
    let mut s = Structure::named("top");
    s.add_substructure("blank", Structure::named("Blank")).unwrap();
    let mut pass = ProjectionPass::new();
    let mut canvas = RecordingCanvas::new();
    pass.draw(Some(&mut s), &mut canvas);

    let columns: Vec<Column> = canvas
        .ops()
        .iter()
        .filter_map(|op| match op {
            DrawOp::BeginColumn { column } => Some(*column),
            _ => None,
        })
        .collect();
    assert_eq!(columns, [Column::Inputs, Column::Outputs]);
    assert!(canvas.pins().is_empty());
}

#[test]
fn net_links_driver_to_every_other_member() {
    let mut graph = FakeGraph {
        ports: vec![
            ("D".into(), Direction::Input),
            ("A".into(), Direction::Output),
            ("B".into(), Direction::Output),
        ],
        nets: vec![NetInfo {
            driver: Some(EndpointRef::port("D")),
            members: vec![
                EndpointRef::port("A"),
                EndpointRef::port("D"),
                EndpointRef::port("B"),
            ],
        }],
        ..Default::default()
    };
    let mut pass = ProjectionPass::new();
    let mut canvas = RecordingCanvas::new();
    let report = pass.draw(Some(&mut graph), &mut canvas);

    let map = pass.id_map();
    let d = map.pin_of(&EndpointRef::port("D")).unwrap();
    let a = map.pin_of(&EndpointRef::port("A")).unwrap();
    let b = map.pin_of(&EndpointRef::port("B")).unwrap();
    let links: Vec<(PinId, PinId)> = canvas.links().iter().map(|(_, s, e)| (*s, *e)).collect();
    assert_eq!(links, [(d, a), (d, b)]);
    assert_eq!(report.links, 2);
    assert!(links.iter().all(|(_, end)| *end != d));
}

#[test]
fn net_without_drawn_driver_is_skipped() {
    let mut graph = FakeGraph {
        ports: vec![("A".into(), Direction::Output), ("B".into(), Direction::Output)],
        nets: vec![
            NetInfo {
                driver: Some(EndpointRef::port("ghost")),
                members: vec![EndpointRef::port("A"), EndpointRef::port("ghost")],
            },
            NetInfo {
                driver: None,
                members: vec![EndpointRef::port("B")],
            },
        ],
        ..Default::default()
    };
    let mut pass = ProjectionPass::new();
    let mut canvas = RecordingCanvas::new();
    let report = pass.draw(Some(&mut graph), &mut canvas);

    assert!(canvas.links().is_empty());
    assert_eq!(report.skipped_nets, 2);
}

#[test]
fn members_without_pins_get_no_link() {
    // m3 routes ipq through the internal node Nipq, which is never drawn.
    let mut s = samples::m3().unwrap();
    let mut pass = ProjectionPass::new();
    let mut canvas = RecordingCanvas::new();
    pass.draw(Some(&mut s), &mut canvas);

    let map = pass.id_map();
    let ipq = map.pin_of(&EndpointRef::port("ipq")).unwrap();
    let p_i1 = map.pin_of(&EndpointRef::sub("p", "i1")).unwrap();
    let q_op2 = map.pin_of(&EndpointRef::sub("q", "op2")).unwrap();
    let from_ipq: Vec<PinId> = canvas
        .links()
        .iter()
        .filter(|(_, s, _)| *s == ipq)
        .map(|(_, _, e)| *e)
        .collect();
    assert_eq!(from_ipq, [p_i1, q_op2]);
    assert!(map.pin_of(&EndpointRef::node("Nipq")).is_none());
    assert!(canvas.nodes().iter().all(|(_, t)| !t.contains("Nipq")));
}

#[test]
fn direct_wire_draws_two_nodes_and_one_link() {
    let mut s = wire();
    let mut pass = ProjectionPass::new();
    let mut canvas = RecordingCanvas::new();
    let report = pass.draw(Some(&mut s), &mut canvas);

    assert_eq!(canvas.nodes().len(), 2);
    assert_eq!(report.nodes, 2);
    let links = canvas.links();
    assert_eq!(links.len(), 1);
    let map = pass.id_map();
    assert_eq!(links[0].1, map.pin_of(&EndpointRef::port("i")).unwrap());
    assert_eq!(links[0].2, map.pin_of(&EndpointRef::port("o")).unwrap());
}

#[test]
fn confirmed_gesture_makes_exactly_one_connect_request() {
    let mut graph = FakeGraph {
        ports: vec![("in".into(), Direction::Input), ("out".into(), Direction::Output)],
        ..Default::default()
    };
    let mut pass = ProjectionPass::new();
    let mut canvas = RecordingCanvas::new();
    pass.draw(Some(&mut graph), &mut canvas);
    let pin_in = pass.id_map().pin_of(&EndpointRef::port("in")).unwrap();
    let pin_out = pass.id_map().pin_of(&EndpointRef::port("out")).unwrap();

    canvas.clear();
    canvas.script_link(pin_in, pin_out, true);
    let report = pass.draw(Some(&mut graph), &mut canvas);

    assert_eq!(
        graph.connects,
        [(EndpointRef::port("in"), EndpointRef::port("out"))]
    );
    assert_eq!(report.connected.len(), 1);
    assert!(canvas.ops().contains(&DrawOp::AcceptNewItem));
    assert!(!canvas.gesture_pending());

    // The gesture is over; the next frame must not connect again.
    pass.draw(Some(&mut graph), &mut canvas);
    assert_eq!(graph.connects.len(), 1);
}

#[test]
fn unconfirmed_gesture_makes_no_connect_request() {
    let mut graph = FakeGraph {
        ports: vec![("in".into(), Direction::Input), ("out".into(), Direction::Output)],
        ..Default::default()
    };
    let mut pass = ProjectionPass::new();
    let mut canvas = RecordingCanvas::new();
    pass.draw(Some(&mut graph), &mut canvas);
    let pin_in = pass.id_map().pin_of(&EndpointRef::port("in")).unwrap();
    let pin_out = pass.id_map().pin_of(&EndpointRef::port("out")).unwrap();

    canvas.script_link(pin_in, pin_out, false);
    for _ in 0..3 {
        let report = pass.draw(Some(&mut graph), &mut canvas);
        assert!(report.connected.is_empty());
    }
    assert!(graph.connects.is_empty());
    assert!(canvas.gesture_pending());
}

#[test]
fn gesture_with_unknown_or_identical_pins_is_rejected() {
    let mut graph = FakeGraph {
        ports: vec![("in".into(), Direction::Input)],
        ..Default::default()
    };
    let mut pass = ProjectionPass::new();
    let mut canvas = RecordingCanvas::new();
    pass.draw(Some(&mut graph), &mut canvas);
    let pin_in = pass.id_map().pin_of(&EndpointRef::port("in")).unwrap();

    canvas.script_link(pin_in, PinId(999), true);
    let report = pass.draw(Some(&mut graph), &mut canvas);
    assert_eq!(report.rejected, 1);

    canvas.script_link(pin_in, pin_in, true);
    let report = pass.draw(Some(&mut graph), &mut canvas);
    assert_eq!(report.rejected, 1);

    assert!(graph.connects.is_empty());
    assert!(canvas.ops().contains(&DrawOp::RejectNewItem));
}

#[test]
fn drag_without_target_opens_and_closes_create_block() {
    let mut s = wire();
    let mut pass = ProjectionPass::new();
    let mut canvas = RecordingCanvas::new();
    pass.draw(Some(&mut s), &mut canvas);
    let pin_i = pass.id_map().pin_of(&EndpointRef::port("i")).unwrap();

    canvas.clear();
    canvas.script_drag(pin_i);
    let report = pass.draw(Some(&mut s), &mut canvas);

    assert_eq!(report.rejected, 0);
    let create: Vec<&DrawOp> = canvas
        .ops()
        .iter()
        .filter(|op| {
            matches!(
                op,
                DrawOp::BeginCreate | DrawOp::EndCreate | DrawOp::AcceptNewItem | DrawOp::RejectNewItem
            )
        })
        .collect();
    assert_eq!(create, [&DrawOp::BeginCreate, &DrawOp::EndCreate]);
}

#[test]
fn refused_connect_is_reported_not_propagated() {
    let mut graph = FakeGraph {
        ports: vec![("a".into(), Direction::Input), ("b".into(), Direction::Input)],
        refuse: true,
        ..Default::default()
    };
    let mut pass = ProjectionPass::new();
    let mut canvas = RecordingCanvas::new();
    pass.draw(Some(&mut graph), &mut canvas);
    let a = pass.id_map().pin_of(&EndpointRef::port("a")).unwrap();
    let b = pass.id_map().pin_of(&EndpointRef::port("b")).unwrap();

    canvas.script_link(a, b, true);
    let report = pass.draw(Some(&mut graph), &mut canvas);
    assert!(report.connected.is_empty());
    assert_eq!(report.failed.len(), 1);
    assert!(report.failed[0].contains("refused"));
}

#[test]
fn two_drivers_are_refused_by_structure() {
    let mut s = Structure::named("clash");
    s.add_port("a", Direction::Input, SignalType::Bit).unwrap();
    s.add_port("b", Direction::Input, SignalType::Bit).unwrap();
    let mut pass = ProjectionPass::new();
    let mut canvas = RecordingCanvas::new();
    pass.draw(Some(&mut s), &mut canvas);
    let a = pass.id_map().pin_of(&EndpointRef::port("a")).unwrap();
    let b = pass.id_map().pin_of(&EndpointRef::port("b")).unwrap();

    canvas.script_link(a, b, true);
    let report = pass.draw(Some(&mut s), &mut canvas);
    // The structure reports the clash while the link is still being dragged.
    assert!(report.connected.is_empty());
    assert!(report.failed.is_empty());
    assert_eq!(report.rejected, 1);
    assert!(report.refusal.as_deref().unwrap_or("").contains("two drivers"));
    assert!(canvas.ops().contains(&DrawOp::RejectNewItem));
    assert!(!canvas.ops().contains(&DrawOp::AcceptNewItem));
    assert!(s.nets.is_empty());
}

#[test]
fn gesture_between_linked_endpoints_is_rejected() {
    let mut graph = FakeGraph {
        ports: vec![("in".into(), Direction::Input), ("out".into(), Direction::Output)],
        nets: vec![NetInfo {
            driver: Some(EndpointRef::port("in")),
            members: vec![EndpointRef::port("in"), EndpointRef::port("out")],
        }],
        ..Default::default()
    };
    let mut pass = ProjectionPass::new();
    let mut canvas = RecordingCanvas::new();
    pass.draw(Some(&mut graph), &mut canvas);
    let pin_in = pass.id_map().pin_of(&EndpointRef::port("in")).unwrap();
    let pin_out = pass.id_map().pin_of(&EndpointRef::port("out")).unwrap();

    canvas.clear();
    canvas.script_link(pin_out, pin_in, true);
    let report = pass.draw(Some(&mut graph), &mut canvas);

    assert!(graph.connects.is_empty());
    assert!(report.connected.is_empty());
    assert_eq!(report.rejected, 1);
    assert_eq!(report.refusal, None);
    assert!(canvas.ops().contains(&DrawOp::RejectNewItem));
}

#[test]
fn confirmed_gesture_connects_instance_ports() {
    let mut s = samples::add_wrapper(SignalType::Auto, SignalType::Auto).unwrap();
    s.add_port("extra", Direction::Output, SignalType::Bit).unwrap();
    let mut pass = ProjectionPass::new();
    let mut canvas = RecordingCanvas::new();
    let before = pass.draw(Some(&mut s), &mut canvas);

    let map = pass.id_map();
    let res = map.pin_of(&EndpointRef::sub("adder", "res")).unwrap();
    let extra = map.pin_of(&EndpointRef::port("extra")).unwrap();
    canvas.script_link(extra, res, true);
    let report = pass.draw(Some(&mut s), &mut canvas);
    assert_eq!(report.connected.len(), 1);

    let net = s.net_of(&EndpointRef::port("extra")).unwrap();
    assert!(net.contains(&EndpointRef::port("o")));
    // The new member shows up as a link on the next frame.
    let after = pass.draw(Some(&mut s), &mut canvas);
    assert_eq!(after.links, before.links + 1);
}

#[test]
fn ids_are_stable_across_frames() {
    let mut s = samples::m2().unwrap();
    let mut pass = ProjectionPass::new();

    let mut first = RecordingCanvas::new();
    frame(&mut pass, &mut s, &mut first);
    let map_first = pass.id_map().clone();

    let mut second = RecordingCanvas::new();
    frame(&mut pass, &mut s, &mut second);

    assert_eq!(first.ops(), second.ops());
    for (pin, _, _) in second.pins() {
        assert_eq!(map_first.endpoint_of(pin), pass.id_map().endpoint_of(pin));
    }
    for (node, _) in second.nodes() {
        assert_eq!(map_first.owner_of(node), pass.id_map().owner_of(node));
    }
}

#[test]
fn ids_are_unique_within_a_frame() {
    let mut s = samples::m1().unwrap();
    let mut pass = ProjectionPass::new();
    let mut canvas = RecordingCanvas::new();
    pass.draw(Some(&mut s), &mut canvas);

    let mut ids: Vec<u64> = Vec::new();
    ids.extend(canvas.nodes().iter().map(|(n, _)| n.0));
    ids.extend(canvas.pins().iter().map(|(p, _, _)| p.0));
    ids.extend(canvas.links().iter().map(|(l, _, _)| l.0));
    let total = ids.len();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), total);
    assert_eq!(ids.first(), Some(&1));
}

#[test]
fn node_owners_map_back_to_graph_objects() {
    let mut s = samples::m1().unwrap();
    let mut pass = ProjectionPass::new();
    let mut canvas = RecordingCanvas::new();
    pass.draw(Some(&mut s), &mut canvas);

    let map = pass.id_map();
    let z = map.node_of(&NodeOwner::Instance("z".into())).unwrap();
    assert_eq!(map.owner_of(z), Some(&NodeOwner::Instance("z".into())));
    let t = map.node_of(&NodeOwner::Port("t".into())).unwrap();
    assert_eq!(map.owner_of(t), Some(&NodeOwner::Port("t".into())));
    assert_eq!(map.owner_of(NodeId(9999)), None);
    // 5 ports + pins of x (2), y (3), z (4)
    assert_eq!(map.pin_count(), 5 + 2 + 3 + 4);
}

#[test]
fn frame_calls_are_balanced() {
    let mut s = samples::m2().unwrap();
    let mut pass = ProjectionPass::new();
    let mut canvas = RecordingCanvas::new();
    canvas.script_drag(PinId(2));
    frame(&mut pass, &mut s, &mut canvas);
    assert!(canvas.is_balanced());
    assert!(canvas.ops().contains(&DrawOp::BeginCreate));
}

#[test]
fn with_node_helper_closes_node() {
    let mut canvas = RecordingCanvas::new();
    let r = canvas.with_node(NodeId(1), "n", |c| {
        c.with_column(Column::Inputs, |c| c.with_pin(PinId(2), PinKind::Input, "p"));
        7
    });
    assert_eq!(r, 7);
    assert!(canvas.is_balanced());
    assert_eq!(canvas.column_pins(NodeId(1), Column::Inputs), ["p"]);
}
