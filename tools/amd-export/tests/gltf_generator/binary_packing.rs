//! Binary data packing for GLTF buffers.

use gltf_json as json;
use json::validation::Checked::Valid;

/// Root -> Tip distance along +Y
pub const TIP_HEIGHT: f32 = 1.0;

/// Offset of the prop node along +X
pub const PROP_OFFSET: f32 = 3.0;

/// Keyframe times of the bend (tip rotation) channel, seconds
pub const BEND_TIMES: [f32; 3] = [0.0, 0.5, 1.0];

/// Keyframe times of the root translation channel, seconds
pub const SLIDE_TIMES: [f32; 2] = [0.0, 1.0];

/// Root slides this far along +X over the clip
pub const SLIDE_DISTANCE: f32 = 2.0;

pub(crate) struct BodyAccessors {
    pub positions: u32,
    pub normals: u32,
    pub uvs: u32,
    pub joints: u32,
    pub weights: u32,
    pub indices: u32,
    pub inverse_binds: u32,
    pub bend_times: u32,
    pub bend_rotations: u32,
    pub slide_times: u32,
    pub slide_translations: u32,
}

pub(crate) struct PropAccessors {
    pub positions: u32,
    pub normals: u32,
    pub indices: u32,
}

pub(crate) struct Packed {
    pub buffer: Vec<u8>,
    pub views: Vec<json::buffer::View>,
    pub accessors: Vec<json::Accessor>,
    pub body: Option<BodyAccessors>,
    pub prop: Option<PropAccessors>,
}

/// Appends views and accessors to one shared buffer
struct Packer {
    buffer: Vec<u8>,
    views: Vec<json::buffer::View>,
    accessors: Vec<json::Accessor>,
}

impl Packer {
    fn push(
        &mut self,
        bytes: &[u8],
        count: usize,
        component: json::accessor::ComponentType,
        type_: json::accessor::Type,
        target: Option<json::buffer::Target>,
        bounds: Option<(Vec<f32>, Vec<f32>)>,
    ) -> u32 {
        let offset = self.buffer.len();
        self.buffer.extend_from_slice(bytes);
        while !self.buffer.len().is_multiple_of(4) {
            self.buffer.push(0);
        }

        self.views.push(json::buffer::View {
            buffer: json::Index::new(0),
            byte_length: bytes.len().into(),
            byte_offset: Some(offset.into()),
            byte_stride: None,
            extensions: Default::default(),
            extras: Default::default(),
            name: None,
            target: target.map(Valid),
        });

        let to_value = |v: Vec<f32>| json::Value::Array(v.into_iter().map(json::Value::from).collect());
        let (min, max) = match bounds {
            Some((min, max)) => (Some(to_value(min)), Some(to_value(max))),
            None => (None, None),
        };
        self.accessors.push(json::Accessor {
            buffer_view: Some(json::Index::new(self.views.len() as u32 - 1)),
            byte_offset: Some(0u64.into()),
            count: count.into(),
            component_type: Valid(json::accessor::GenericComponentType(component)),
            extensions: Default::default(),
            extras: Default::default(),
            type_: Valid(type_),
            min,
            max,
            name: None,
            normalized: false,
            sparse: None,
        });
        self.accessors.len() as u32 - 1
    }

    fn push_vec3(&mut self, data: &[[f32; 3]], target: Option<json::buffer::Target>) -> u32 {
        self.push(
            bytemuck::cast_slice(data),
            data.len(),
            json::accessor::ComponentType::F32,
            json::accessor::Type::Vec3,
            target,
            None,
        )
    }

    fn push_positions(&mut self, data: &[[f32; 3]]) -> u32 {
        let mut min = [f32::MAX; 3];
        let mut max = [f32::MIN; 3];
        for p in data {
            for i in 0..3 {
                min[i] = min[i].min(p[i]);
                max[i] = max[i].max(p[i]);
            }
        }
        self.push(
            bytemuck::cast_slice(data),
            data.len(),
            json::accessor::ComponentType::F32,
            json::accessor::Type::Vec3,
            Some(json::buffer::Target::ArrayBuffer),
            Some((min.to_vec(), max.to_vec())),
        )
    }

    fn push_indices(&mut self, data: &[u16]) -> u32 {
        self.push(
            bytemuck::cast_slice(data),
            data.len(),
            json::accessor::ComponentType::U16,
            json::accessor::Type::Scalar,
            Some(json::buffer::Target::ElementArrayBuffer),
            None,
        )
    }

    fn push_times(&mut self, times: &[f32]) -> u32 {
        let first = times.first().copied().unwrap_or(0.0);
        let last = times.last().copied().unwrap_or(0.0);
        self.push(
            bytemuck::cast_slice(times),
            times.len(),
            json::accessor::ComponentType::F32,
            json::accessor::Type::Scalar,
            None,
            Some((vec![first], vec![last])),
        )
    }
}

const QUAD_INDICES: [u16; 6] = [0, 1, 2, 0, 2, 3];
const QUAD_NORMALS: [[f32; 3]; 4] = [[0.0, 0.0, 1.0]; 4];

/// Pack all binary data into a single buffer
pub(crate) fn pack_binary_data(skinned: bool, prop: bool) -> Packed {
    let mut packer = Packer {
        buffer: Vec::new(),
        views: Vec::new(),
        accessors: Vec::new(),
    };

    let body = skinned.then(|| pack_body(&mut packer));

    let prop = prop.then(|| {
        let positions = [
            [-1.0, -1.0, 0.0],
            [1.0, -1.0, 0.0],
            [1.0, 1.0, 0.0],
            [-1.0, 1.0, 0.0],
        ];
        PropAccessors {
            positions: packer.push_positions(&positions),
            normals: packer.push_vec3(&QUAD_NORMALS, Some(json::buffer::Target::ArrayBuffer)),
            indices: packer.push_indices(&QUAD_INDICES),
        }
    });

    Packed {
        buffer: packer.buffer,
        views: packer.views,
        accessors: packer.accessors,
        body,
        prop,
    }
}

fn pack_body(packer: &mut Packer) -> BodyAccessors {
    // Bottom edge on Root, top edge split 3:1 between Tip and Root
    let positions = [
        [-0.5, -TIP_HEIGHT, 0.0],
        [0.5, -TIP_HEIGHT, 0.0],
        [0.5, TIP_HEIGHT, 0.0],
        [-0.5, TIP_HEIGHT, 0.0],
    ];
    let uvs: [[f32; 2]; 4] = [[0.0, 1.0], [1.0, 1.0], [1.0, 0.0], [0.0, 0.0]];
    let joints: [[u16; 4]; 4] = [[0, 0, 0, 0], [0, 0, 0, 0], [1, 0, 0, 0], [1, 0, 0, 0]];
    let weights: [[f32; 4]; 4] = [
        [1.0, 0.0, 0.0, 0.0],
        [1.0, 0.0, 0.0, 0.0],
        [0.75, 0.25, 0.0, 0.0],
        [0.75, 0.25, 0.0, 0.0],
    ];

    // Inverse bind matrices, column major
    let root_ibm = glam::Mat4::IDENTITY.to_cols_array();
    let tip_ibm = glam::Mat4::from_translation(glam::Vec3::new(0.0, -TIP_HEIGHT, 0.0)).to_cols_array();
    let ibms = [root_ibm, tip_ibm];

    let quarter = glam::Quat::from_rotation_z(std::f32::consts::FRAC_PI_4).to_array();
    let half = glam::Quat::from_rotation_z(std::f32::consts::FRAC_PI_2).to_array();
    let bend: [[f32; 4]; 3] = [glam::Quat::IDENTITY.to_array(), quarter, half];
    let slide: [[f32; 3]; 2] = [[0.0, 0.0, 0.0], [SLIDE_DISTANCE, 0.0, 0.0]];

    let array = Some(json::buffer::Target::ArrayBuffer);
    BodyAccessors {
        positions: packer.push_positions(&positions),
        normals: packer.push_vec3(&QUAD_NORMALS, array),
        uvs: packer.push(
            bytemuck::cast_slice(&uvs),
            uvs.len(),
            json::accessor::ComponentType::F32,
            json::accessor::Type::Vec2,
            array,
            None,
        ),
        joints: packer.push(
            bytemuck::cast_slice(&joints),
            joints.len(),
            json::accessor::ComponentType::U16,
            json::accessor::Type::Vec4,
            array,
            None,
        ),
        weights: packer.push(
            bytemuck::cast_slice(&weights),
            weights.len(),
            json::accessor::ComponentType::F32,
            json::accessor::Type::Vec4,
            array,
            None,
        ),
        indices: packer.push_indices(&QUAD_INDICES),
        inverse_binds: packer.push(
            bytemuck::cast_slice(&ibms),
            ibms.len(),
            json::accessor::ComponentType::F32,
            json::accessor::Type::Mat4,
            None,
            None,
        ),
        bend_times: packer.push_times(&BEND_TIMES),
        bend_rotations: packer.push(
            bytemuck::cast_slice(&bend),
            bend.len(),
            json::accessor::ComponentType::F32,
            json::accessor::Type::Vec4,
            None,
            None,
        ),
        slide_times: packer.push_times(&SLIDE_TIMES),
        slide_translations: packer.push_vec3(&slide, None),
    }
}
