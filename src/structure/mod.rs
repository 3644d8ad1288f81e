//! Structure graph model.
//!
//! A [`Structure`] is a hardware design fragment: externally visible ports,
//! internal named nodes, named instances of nested structures
//! ([`Substructure`]) and the nets that tie all of these together. Every map
//! preserves declaration order, which is also the order the editor projects
//! objects onto the canvas.
//!
//! Only connectivity is modelled here. Type deduction, deduplication and code
//! generation are left to the modelling library that produces the documents.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

pub mod doc;
pub mod navigation;
mod signal;
pub mod source;

pub use doc::StructureDoc;
pub use navigation::{collect_instance_paths, resolve_instance_path, split_instance_path};
pub use signal::{Direction, SignalType};

// ────────────────────────────────────────────────────────────────────────────
// Errors
// ────────────────────────────────────────────────────────────────────────────

/// Errors raised by structure mutations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StructureError {
    #[error("duplicate {kind} name '{name}'")]
    DuplicateName { kind: &'static str, name: String },
    #[error("unknown endpoint {0}")]
    UnknownEndpoint(EndpointRef),
    #[error("cannot connect {0} to itself")]
    SelfConnection(EndpointRef),
    #[error("net would have two drivers: {first} and {second}")]
    MultipleDrivers {
        first: EndpointRef,
        second: EndpointRef,
    },
}

// ────────────────────────────────────────────────────────────────────────────
// Ports, nodes, substructures
// ────────────────────────────────────────────────────────────────────────────

/// An externally visible port.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Port {
    pub name: String,
    pub direction: Direction,
    pub signal: SignalType,
    /// Register stages inserted behind this port.
    #[serde(default)]
    pub latency: u32,
}

/// An internal named net point. Nodes never drive a net and are not shown on
/// the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub name: String,
    pub signal: SignalType,
}

/// A named instance of a nested structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Substructure {
    pub name: String,
    pub structure: Structure,
}

// ────────────────────────────────────────────────────────────────────────────
// Endpoints and nets
// ────────────────────────────────────────────────────────────────────────────

/// Something a net can be attached to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EndpointRef {
    /// A port of the structure itself.
    Port(String),
    /// An internal node of the structure.
    Node(String),
    /// A port of a substructure instance.
    SubPort { instance: String, port: String },
}

impl EndpointRef {
    pub fn port(name: impl Into<String>) -> Self {
        EndpointRef::Port(name.into())
    }

    pub fn node(name: impl Into<String>) -> Self {
        EndpointRef::Node(name.into())
    }

    pub fn sub(instance: impl Into<String>, port: impl Into<String>) -> Self {
        EndpointRef::SubPort {
            instance: instance.into(),
            port: port.into(),
        }
    }
}

impl fmt::Display for EndpointRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EndpointRef::Port(name) => f.write_str(name),
            EndpointRef::Node(name) => write!(f, "node {}", name),
            EndpointRef::SubPort { instance, port } => write!(f, "{}.{}", instance, port),
        }
    }
}

/// A set of connected endpoints. At most one member drives the net.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Net {
    pub members: Vec<EndpointRef>,
}

impl Net {
    pub fn contains(&self, ep: &EndpointRef) -> bool {
        self.members.contains(ep)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Structure
// ────────────────────────────────────────────────────────────────────────────

/// A structure graph: ports, nodes, substructure instances and nets.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Structure {
    #[serde(default)]
    pub name: Option<String>,
    /// Name shared by all reusable copies of this structure (e.g. `Add_UInt_4_UInt_4`).
    #[serde(default)]
    pub unique_name: Option<String>,
    #[serde(default)]
    pub ports: IndexMap<String, Port>,
    #[serde(default)]
    pub nodes: IndexMap<String, Node>,
    #[serde(default)]
    pub substructures: IndexMap<String, Substructure>,
    #[serde(default)]
    pub nets: Vec<Net>,
}

/// Counts shown by the explorer and the CLI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructureSummary {
    pub name: String,
    pub inputs: usize,
    pub outputs: usize,
    pub nodes: usize,
    pub substructures: usize,
    pub nets: usize,
}

impl Structure {
    /// Create an empty, anonymous structure.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty structure with a display name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn with_unique_name(mut self, unique_name: impl Into<String>) -> Self {
        self.unique_name = Some(unique_name.into());
        self
    }

    /// Name used when this structure is shown as an instance type.
    pub fn type_name(&self) -> &str {
        self.unique_name
            .as_deref()
            .or(self.name.as_deref())
            .unwrap_or("<anonymous>")
    }

    /// Declare a port. Returns the endpoint to connect it with.
    pub fn add_port(
        &mut self,
        name: impl Into<String>,
        direction: Direction,
        signal: SignalType,
    ) -> Result<EndpointRef, StructureError> {
        let name = name.into();
        if self.ports.contains_key(&name) {
            return Err(StructureError::DuplicateName { kind: "port", name });
        }
        self.ports.insert(
            name.clone(),
            Port {
                name: name.clone(),
                direction,
                signal,
                latency: 0,
            },
        );
        Ok(EndpointRef::Port(name))
    }

    /// Declare an internal node.
    pub fn add_node(
        &mut self,
        name: impl Into<String>,
        signal: SignalType,
    ) -> Result<EndpointRef, StructureError> {
        let name = name.into();
        if self.nodes.contains_key(&name) {
            return Err(StructureError::DuplicateName { kind: "node", name });
        }
        self.nodes.insert(
            name.clone(),
            Node {
                name: name.clone(),
                signal,
            },
        );
        Ok(EndpointRef::Node(name))
    }

    /// Instantiate `structure` under `name`. The instance owns its own copy.
    pub fn add_substructure(
        &mut self,
        name: impl Into<String>,
        structure: Structure,
    ) -> Result<(), StructureError> {
        let name = name.into();
        if self.substructures.contains_key(&name) {
            return Err(StructureError::DuplicateName {
                kind: "substructure",
                name,
            });
        }
        self.substructures.insert(
            name.clone(),
            Substructure {
                name,
                structure,
            },
        );
        Ok(())
    }

    pub fn set_latency(&mut self, port: &str, latency: u32) -> Result<(), StructureError> {
        match self.ports.get_mut(port) {
            Some(p) => {
                p.latency = latency;
                Ok(())
            }
            None => Err(StructureError::UnknownEndpoint(EndpointRef::port(port))),
        }
    }

    pub fn endpoint_exists(&self, ep: &EndpointRef) -> bool {
        match ep {
            EndpointRef::Port(name) => self.ports.contains_key(name),
            EndpointRef::Node(name) => self.nodes.contains_key(name),
            EndpointRef::SubPort { instance, port } => self
                .substructures
                .get(instance)
                .is_some_and(|s| s.structure.ports.contains_key(port)),
        }
    }

    /// Direction of the port behind `ep`, from the owning structure's point of
    /// view. Nodes have no direction.
    pub fn endpoint_direction(&self, ep: &EndpointRef) -> Option<Direction> {
        match ep {
            EndpointRef::Port(name) => self.ports.get(name).map(|p| p.direction),
            EndpointRef::Node(_) => None,
            EndpointRef::SubPort { instance, port } => self
                .substructures
                .get(instance)
                .and_then(|s| s.structure.ports.get(port))
                .map(|p| p.direction),
        }
    }

    /// Whether `ep` drives whatever net it is attached to.
    ///
    /// Inside a structure its own input ports and its substructures' output
    /// ports are drivers; everything else is a consumer.
    pub fn is_driver(&self, ep: &EndpointRef) -> bool {
        match ep {
            EndpointRef::Port(_) => self.endpoint_direction(ep) == Some(Direction::Input),
            EndpointRef::Node(_) => false,
            EndpointRef::SubPort { .. } => self.endpoint_direction(ep) == Some(Direction::Output),
        }
    }

    fn net_index(&self, ep: &EndpointRef) -> Option<usize> {
        self.nets.iter().position(|n| n.contains(ep))
    }

    /// The net `ep` is attached to, if any.
    pub fn net_of(&self, ep: &EndpointRef) -> Option<&Net> {
        self.net_index(ep).map(|i| &self.nets[i])
    }

    /// The driving member of `net`, if it has one.
    pub fn net_driver<'a>(&self, net: &'a Net) -> Option<&'a EndpointRef> {
        net.members.iter().find(|m| self.is_driver(m))
    }

    /// Members of the net that connecting `a` and `b` would produce.
    fn merged_members(&self, a: &EndpointRef, b: &EndpointRef) -> Vec<EndpointRef> {
        let mut members = match self.net_index(a) {
            Some(i) => self.nets[i].members.clone(),
            None => vec![a.clone()],
        };
        let other = match self.net_index(b) {
            Some(i) => self.nets[i].members.clone(),
            None => vec![b.clone()],
        };
        for m in other {
            if !members.contains(&m) {
                members.push(m);
            }
        }
        members
    }

    /// Whether `a` and `b` are already members of the same net.
    pub fn shares_net(&self, a: &EndpointRef, b: &EndpointRef) -> bool {
        let ia = self.net_index(a);
        ia.is_some() && ia == self.net_index(b)
    }

    /// Check that [`Structure::connect`] would accept `a` and `b`, without
    /// changing anything.
    pub fn check_connect(&self, a: &EndpointRef, b: &EndpointRef) -> Result<(), StructureError> {
        for ep in [a, b] {
            if !self.endpoint_exists(ep) {
                return Err(StructureError::UnknownEndpoint(ep.clone()));
            }
        }
        if a == b {
            return Err(StructureError::SelfConnection(a.clone()));
        }
        if self.shares_net(a, b) {
            return Ok(());
        }
        let members = self.merged_members(a, b);
        let mut drivers = members.iter().filter(|m| self.is_driver(m));
        if let (Some(first), Some(second)) = (drivers.next(), drivers.next()) {
            return Err(StructureError::MultipleDrivers {
                first: first.clone(),
                second: second.clone(),
            });
        }
        Ok(())
    }

    /// Connect two endpoints, merging their nets.
    ///
    /// The call is symmetric. Connecting endpoints that already share a net
    /// is a no-op.
    pub fn connect(&mut self, a: &EndpointRef, b: &EndpointRef) -> Result<(), StructureError> {
        self.check_connect(a, b)?;
        if self.shares_net(a, b) {
            return Ok(());
        }
        let (ia, ib) = (self.net_index(a), self.net_index(b));
        let members = self.merged_members(a, b);

        // The merged net takes the slot of the older one so net order stays stable.
        match (ia, ib) {
            (Some(x), Some(y)) => {
                let (keep, drop) = (x.min(y), x.max(y));
                self.nets[keep].members = members;
                self.nets.remove(drop);
            }
            (Some(i), None) | (None, Some(i)) => self.nets[i].members = members,
            (None, None) => self.nets.push(Net { members }),
        }
        Ok(())
    }

    /// Deep copy of this structure, including every nested instance.
    pub fn duplicate(&self) -> Structure {
        self.clone()
    }

    pub fn summary(&self) -> StructureSummary {
        let inputs = self.ports.values().filter(|p| p.direction.is_input()).count();
        StructureSummary {
            name: self.type_name().to_string(),
            inputs,
            outputs: self.ports.len() - inputs,
            nodes: self.nodes.len(),
            substructures: self.substructures.len(),
            nets: self.nets.len(),
        }
    }
}
