//! Graph projection pass.
//!
//! Once per frame the pass walks a [`StructureGraph`] and issues canvas calls
//! that mirror it: one node per visible port, one node per substructure
//! instance (inputs column, then outputs column), and one link from every
//! net's driver to each other rendered member. Canvas ids come from a counter
//! that restarts every frame and is handed out in projection order, so an
//! unchanged graph gets the same ids on every frame.
//!
//! The pass keeps a lookup table from canvas ids back to graph endpoints so a
//! confirmed link-creation gesture can be turned into a `connect` call. The
//! table only names endpoints; the graph stays owned by the caller.

use std::collections::HashMap;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::canvas::{Canvas, Column, LinkId, NodeId, PinId, PinKind};
use crate::graph::{PortInfo, StructureGraph};
use crate::structure::EndpointRef;

/// Graph object a canvas node stands for.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum NodeOwner {
    /// A visible port of the projected structure.
    Port(String),
    /// A substructure instance.
    Instance(String),
}

/// Bidirectional table between canvas ids and graph objects for one frame.
#[derive(Debug, Clone, Default)]
pub struct CanvasIdMap {
    pin_to_endpoint: HashMap<PinId, EndpointRef>,
    endpoint_to_pin: HashMap<EndpointRef, PinId>,
    node_to_owner: HashMap<NodeId, NodeOwner>,
    owner_to_node: HashMap<NodeOwner, NodeId>,
}

impl CanvasIdMap {
    fn clear(&mut self) {
        self.pin_to_endpoint.clear();
        self.endpoint_to_pin.clear();
        self.node_to_owner.clear();
        self.owner_to_node.clear();
    }

    fn insert_pin(&mut self, pin: PinId, endpoint: EndpointRef) {
        self.endpoint_to_pin.insert(endpoint.clone(), pin);
        self.pin_to_endpoint.insert(pin, endpoint);
    }

    fn insert_node(&mut self, node: NodeId, owner: NodeOwner) {
        self.owner_to_node.insert(owner.clone(), node);
        self.node_to_owner.insert(node, owner);
    }

    pub fn endpoint_of(&self, pin: PinId) -> Option<&EndpointRef> {
        self.pin_to_endpoint.get(&pin)
    }

    pub fn pin_of(&self, endpoint: &EndpointRef) -> Option<PinId> {
        self.endpoint_to_pin.get(endpoint).copied()
    }

    pub fn owner_of(&self, node: NodeId) -> Option<&NodeOwner> {
        self.node_to_owner.get(&node)
    }

    pub fn node_of(&self, owner: &NodeOwner) -> Option<NodeId> {
        self.owner_to_node.get(owner).copied()
    }

    pub fn pin_count(&self) -> usize {
        self.pin_to_endpoint.len()
    }
}

/// Per-frame id counter shared by nodes, pins and links.
#[derive(Debug, Clone, Default)]
struct IdAllocator {
    last: u64,
}

impl IdAllocator {
    fn reset(&mut self) {
        self.last = 0;
    }

    fn next(&mut self) -> u64 {
        self.last += 1;
        self.last
    }
}

/// What one frame of the pass produced.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FrameReport {
    pub nodes: usize,
    pub pins: usize,
    pub links: usize,
    /// Nets skipped because their driver is not on the canvas.
    pub skipped_nets: usize,
    /// Connections made from confirmed gestures, as (start, end) endpoints.
    pub connected: Vec<(EndpointRef, EndpointRef)>,
    /// Confirmed gestures the graph refused to connect.
    pub failed: Vec<String>,
    /// Gestures rejected because an endpoint was missing, both were the same
    /// pin, the endpoints already share a net or the graph would refuse them.
    pub rejected: usize,
    /// Why the graph would refuse the gesture in progress, if it would.
    pub refusal: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ProjectionPass {
    ids: IdAllocator,
    map: CanvasIdMap,
}

fn already_linked<G>(graph: &G, a: &EndpointRef, b: &EndpointRef) -> bool
where
    G: StructureGraph + ?Sized,
{
    graph
        .net_list()
        .iter()
        .any(|net| net.members.contains(a) && net.members.contains(b))
}

fn pin_kind(port: &PortInfo<'_>) -> PinKind {
    if port.direction.is_input() {
        PinKind::Input
    } else {
        PinKind::Output
    }
}

impl ProjectionPass {
    pub fn new() -> Self {
        Self::default()
    }

    /// Id table built by the most recent frame.
    pub fn id_map(&self) -> &CanvasIdMap {
        &self.map
    }

    /// Project one frame. An absent graph draws nothing.
    pub fn draw<G, C>(&mut self, graph: Option<&mut G>, canvas: &mut C) -> FrameReport
    where
        G: StructureGraph + ?Sized,
        C: Canvas,
    {
        self.ids.reset();
        self.map.clear();
        let mut report = FrameReport::default();
        let Some(graph) = graph else {
            return report;
        };

        self.project_ports(&*graph, canvas, &mut report);
        self.project_instances(&*graph, canvas, &mut report);
        self.project_links(&*graph, canvas, &mut report);
        self.handle_create(graph, canvas, &mut report);
        report
    }

    fn project_ports<G, C>(&mut self, graph: &G, canvas: &mut C, report: &mut FrameReport)
    where
        G: StructureGraph + ?Sized,
        C: Canvas,
    {
        for port in graph.visible_ports() {
            let node = NodeId(self.ids.next());
            let pin = PinId(self.ids.next());
            canvas.with_node(node, port.name, |c| {
                c.with_pin(pin, pin_kind(&port), &port.type_name);
            });
            self.map.insert_node(node, NodeOwner::Port(port.name.to_string()));
            self.map.insert_pin(pin, EndpointRef::port(port.name));
            report.nodes += 1;
            report.pins += 1;
        }
    }

    fn project_instances<G, C>(&mut self, graph: &G, canvas: &mut C, report: &mut FrameReport)
    where
        G: StructureGraph + ?Sized,
        C: Canvas,
    {
        for inst in graph.instances() {
            let node = NodeId(self.ids.next());
            let title = format!("{}: {}", inst.name, inst.type_name);
            canvas.begin_node(node, &title);
            for (column, want_input) in [(Column::Inputs, true), (Column::Outputs, false)] {
                canvas.begin_column(column);
                for port in inst.ports.iter().filter(|p| p.direction.is_input() == want_input) {
                    let pin = PinId(self.ids.next());
                    canvas.with_pin(pin, pin_kind(port), port.name);
                    self.map.insert_pin(pin, EndpointRef::sub(inst.name, port.name));
                    report.pins += 1;
                }
                canvas.end_column();
            }
            canvas.end_node();
            self.map.insert_node(node, NodeOwner::Instance(inst.name.to_string()));
            report.nodes += 1;
        }
    }

    fn project_links<G, C>(&mut self, graph: &G, canvas: &mut C, report: &mut FrameReport)
    where
        G: StructureGraph + ?Sized,
        C: Canvas,
    {
        for net in graph.net_list() {
            let Some(start) = net.driver.as_ref().and_then(|d| self.map.pin_of(d)) else {
                report.skipped_nets += 1;
                continue;
            };
            for member in &net.members {
                if Some(member) == net.driver.as_ref() {
                    continue;
                }
                let Some(end) = self.map.pin_of(member) else {
                    continue;
                };
                let id = LinkId(self.ids.next());
                canvas.link(id, start, end);
                report.links += 1;
            }
        }
    }

    fn handle_create<G, C>(&mut self, graph: &mut G, canvas: &mut C, report: &mut FrameReport)
    where
        G: StructureGraph + ?Sized,
        C: Canvas,
    {
        if !canvas.begin_create() {
            return;
        }
        if let Some((a, b)) = canvas.query_new_link() {
            let endpoints = match (self.map.endpoint_of(a), self.map.endpoint_of(b)) {
                (Some(ea), Some(eb)) if a != b => Some((ea.clone(), eb.clone())),
                _ => None,
            };
            match endpoints {
                Some((ea, eb)) if already_linked(&*graph, &ea, &eb) => {
                    debug!(start = %ea, end = %eb, "endpoints already share a net");
                    canvas.reject_new_item();
                    report.rejected += 1;
                }
                Some((ea, eb)) => match graph.can_connect(&ea, &eb) {
                    Ok(()) => {
                        if canvas.accept_new_item() {
                            match graph.connect_endpoints(&ea, &eb) {
                                Ok(()) => {
                                    info!(start = %ea, end = %eb, "connected");
                                    report.connected.push((ea, eb));
                                }
                                Err(e) => {
                                    warn!(start = %ea, end = %eb, error = %e, "connect refused");
                                    report.failed.push(format!("{} -> {}: {}", ea, eb, e));
                                }
                            }
                        }
                    }
                    Err(e) => {
                        debug!(start = %ea, end = %eb, error = %e, "graph would refuse link");
                        canvas.reject_new_item();
                        report.rejected += 1;
                        report.refusal = Some(format!("{} -> {}: {}", ea, eb, e));
                    }
                },
                None => {
                    debug!(?a, ?b, "link gesture has no valid endpoints");
                    canvas.reject_new_item();
                    report.rejected += 1;
                }
            }
        }
        canvas.end_create();
    }
}
