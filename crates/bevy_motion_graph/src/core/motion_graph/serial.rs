use std::{
    fs::File,
    io::{BufReader, BufWriter, Read, Write},
    path::Path,
};

use bevy::math::Vec3;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::{ContactLabel, MotionGraph, MotionState, TransitionInfo};
use crate::core::{
    errors::AssetLoaderError,
    id::{SequenceId, StateId},
    pose::{BoneTransform, Pose},
};

/// On-disk layout of a `.mog` motion graph.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct MotionGraphSerial {
    pub speed: f32,
    pub frame_duration: f32,
    pub states: Vec<MotionStateSerial>,
    #[serde(default)]
    pub transitions: Vec<TransitionSerial>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct MotionStateSerial {
    pub sequence: SequenceId,
    pub index_in_sequence: usize,
    pub pose: Vec<BoneTransform>,
    pub contact: ContactLabel,
    pub root_local_velocity: Vec3,
    pub yaw_angular_velocity: f32,
    pub left_foot_height: f32,
    pub right_foot_height: f32,
    pub children: Vec<StateId>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct TransitionSerial {
    pub from: StateId,
    pub to: StateId,
    pub path: Vec<StateId>,
    pub delta_position: Vec3,
    pub delta_yaw: f32,
}

impl From<&MotionState> for MotionStateSerial {
    fn from(state: &MotionState) -> Self {
        Self {
            sequence: state.sequence,
            index_in_sequence: state.index_in_sequence,
            pose: state.pose.transforms.clone(),
            contact: state.contact,
            root_local_velocity: state.root_local_velocity,
            yaw_angular_velocity: state.yaw_angular_velocity,
            left_foot_height: state.left_foot_height,
            right_foot_height: state.right_foot_height,
            children: state.children.iter().copied().collect(),
        }
    }
}

impl From<MotionStateSerial> for MotionState {
    fn from(serial: MotionStateSerial) -> Self {
        Self {
            pose: Pose::new(serial.pose),
            sequence: serial.sequence,
            index_in_sequence: serial.index_in_sequence,
            root_local_velocity: serial.root_local_velocity,
            yaw_angular_velocity: serial.yaw_angular_velocity,
            left_foot_height: serial.left_foot_height,
            right_foot_height: serial.right_foot_height,
            contact: serial.contact,
            children: serial.children.into_iter().collect(),
        }
    }
}

impl From<&MotionGraph> for MotionGraphSerial {
    fn from(graph: &MotionGraph) -> Self {
        Self {
            speed: graph.speed,
            frame_duration: graph.frame_duration,
            states: graph.states.iter().map(MotionStateSerial::from).collect(),
            transitions: graph
                .transition_cache
                .iter()
                .map(|(&(from, to), info)| TransitionSerial {
                    from,
                    to,
                    path: info.path.clone(),
                    delta_position: info.delta_position,
                    delta_yaw: info.delta_yaw,
                })
                .collect(),
        }
    }
}

impl From<MotionGraphSerial> for MotionGraph {
    fn from(serial: MotionGraphSerial) -> Self {
        let transition_cache: IndexMap<_, _> = serial
            .transitions
            .into_iter()
            .map(|t| {
                (
                    (t.from, t.to),
                    TransitionInfo {
                        path: t.path,
                        delta_position: t.delta_position,
                        delta_yaw: t.delta_yaw,
                    },
                )
            })
            .collect();

        Self {
            states: serial.states.into_iter().map(MotionState::from).collect(),
            speed: serial.speed,
            frame_duration: serial.frame_duration,
            transition_cache,
        }
    }
}

impl MotionGraph {
    pub fn to_bytes(&self) -> Result<Vec<u8>, AssetLoaderError> {
        Ok(rmp_serde::to_vec_named(&MotionGraphSerial::from(self))?)
    }

    /// Decodes a graph and checks it with [`MotionGraph::validate`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, AssetLoaderError> {
        let serial: MotionGraphSerial = rmp_serde::from_slice(bytes)?;
        let graph = MotionGraph::from(serial);
        graph.validate()?;
        Ok(graph)
    }

    pub fn write_to(&self, writer: &mut impl Write) -> Result<(), AssetLoaderError> {
        writer.write_all(&self.to_bytes()?)?;
        Ok(())
    }

    pub fn read_from(reader: &mut impl Read) -> Result<Self, AssetLoaderError> {
        let mut bytes = vec![];
        reader.read_to_end(&mut bytes)?;
        Self::from_bytes(&bytes)
    }

    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), AssetLoaderError> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.write_to(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, AssetLoaderError> {
        let mut reader = BufReader::new(File::open(path)?);
        Self::read_from(&mut reader)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{core::errors::MotionGraphError, utils::fixtures::chain_states};
    use bevy::math::Quat;

    fn sample_graph() -> MotionGraph {
        let mut states = chain_states(&[3]);
        states[2].children.insert(0);
        states[1].contact = ContactLabel::LeftOnly;
        states[1].root_local_velocity = Vec3::new(0., 0., 0.05);
        states[1].yaw_angular_velocity = 0.01;
        states[1].left_foot_height = 0.02;
        states[1].pose = Pose::new(vec![
            BoneTransform::from_translation(Vec3::Y).with_rotation(Quat::from_rotation_y(0.3)),
        ]);
        let mut graph = MotionGraph::new(states, 1.3, 1. / 30.);
        graph.transition_cache.insert(
            (2, 1),
            TransitionInfo {
                path: vec![0, 1],
                delta_position: Vec3::new(0., 0., 0.05),
                delta_yaw: 0.01,
            },
        );
        graph
    }

    #[test]
    fn binary_round_trip() {
        let graph = sample_graph();
        let mut bytes = vec![];
        graph.write_to(&mut bytes).unwrap();
        let decoded = MotionGraph::read_from(&mut bytes.as_slice()).unwrap();
        assert_eq!(decoded, graph);
        assert_eq!(
            decoded.transition_cache.keys().collect::<Vec<_>>(),
            graph.transition_cache.keys().collect::<Vec<_>>()
        );
    }

    #[test]
    fn empty_graph_round_trip() {
        let graph = MotionGraph::default();
        let decoded = MotionGraph::from_bytes(&graph.to_bytes().unwrap()).unwrap();
        assert!(decoded.is_empty());
        assert_eq!(decoded.speed, 1.);
        assert!(decoded.transition_cache.is_empty());
    }

    #[test]
    fn decoding_rejects_out_of_range_children() {
        let mut serial = MotionGraphSerial::from(&sample_graph());
        serial.states[0].children.push(42);
        let bytes = rmp_serde::to_vec_named(&serial).unwrap();
        let err = MotionGraph::from_bytes(&bytes).unwrap_err();
        assert!(matches!(
            err,
            AssetLoaderError::InconsistentGraph(MotionGraphError::StructuralInconsistency {
                child: 42,
                ..
            })
        ));
    }
}
