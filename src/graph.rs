//! Query/mutation seam between a structure graph and the projection pass.
//!
//! The pass never reaches into a [`Structure`] directly; it reads ports,
//! instances and nets through [`StructureGraph`] and asks it to connect two
//! endpoints when the user confirms a new link. Tests drive the pass with
//! small hand-written graphs through the same trait.

use std::fmt::Display;

use crate::structure::{Direction, EndpointRef, Structure, StructureError};

/// A port as the projection pass sees it.
#[derive(Debug, Clone, PartialEq)]
pub struct PortInfo<'a> {
    pub name: &'a str,
    pub direction: Direction,
    pub type_name: String,
}

/// A substructure instance with its ports in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct InstanceInfo<'a> {
    pub name: &'a str,
    pub type_name: &'a str,
    pub ports: Vec<PortInfo<'a>>,
}

/// A net with its resolved driver, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct NetInfo {
    pub driver: Option<EndpointRef>,
    pub members: Vec<EndpointRef>,
}

pub trait StructureGraph {
    type Error: Display;

    /// Externally visible ports, in declaration order.
    fn visible_ports(&self) -> Vec<PortInfo<'_>>;
    /// Substructure instances, in declaration order.
    fn instances(&self) -> Vec<InstanceInfo<'_>>;
    fn net_list(&self) -> Vec<NetInfo>;
    /// Connect two endpoints in the underlying graph.
    fn connect_endpoints(&mut self, a: &EndpointRef, b: &EndpointRef) -> Result<(), Self::Error>;

    /// Whether [`StructureGraph::connect_endpoints`] would accept `a` and `b`.
    ///
    /// Used while a link is still being dragged. Graphs that cannot tell in
    /// advance accept everything and refuse on connect.
    fn can_connect(&self, _a: &EndpointRef, _b: &EndpointRef) -> Result<(), Self::Error> {
        Ok(())
    }
}

fn port_infos(structure: &Structure) -> Vec<PortInfo<'_>> {
    structure
        .ports
        .values()
        .map(|p| PortInfo {
            name: p.name.as_str(),
            direction: p.direction,
            type_name: p.signal.to_string(),
        })
        .collect()
}

impl StructureGraph for Structure {
    type Error = StructureError;

    fn visible_ports(&self) -> Vec<PortInfo<'_>> {
        port_infos(self)
    }

    fn instances(&self) -> Vec<InstanceInfo<'_>> {
        self.substructures
            .iter()
            .map(|(name, sub)| InstanceInfo {
                name: name.as_str(),
                type_name: sub.structure.type_name(),
                ports: port_infos(&sub.structure),
            })
            .collect()
    }

    fn net_list(&self) -> Vec<NetInfo> {
        self.nets
            .iter()
            .map(|net| NetInfo {
                driver: self.net_driver(net).cloned(),
                members: net.members.clone(),
            })
            .collect()
    }

    fn connect_endpoints(&mut self, a: &EndpointRef, b: &EndpointRef) -> Result<(), StructureError> {
        self.connect(a, b)
    }

    fn can_connect(&self, a: &EndpointRef, b: &EndpointRef) -> Result<(), StructureError> {
        self.check_connect(a, b)
    }
}
