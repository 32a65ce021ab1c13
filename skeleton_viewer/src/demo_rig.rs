//! Hand-built demo character
//!
//! Stands in for the animation runtime: bones carry world transforms and
//! attachments carry world-space vertices, recomputed by [`pose`] each frame.

use skeleton_batcher::foundation::math::colors;
use skeleton_batcher::prelude::*;

/// Texture page holding the body parts
pub const BODY_PAGE: TextureId = TextureId(1);

/// Texture page holding effect sprites
pub const FX_PAGE: TextureId = TextureId(2);

const HAND_BONE: usize = 1;
const SPARK_SLOT: usize = 2;

/// Axis-aligned quad centred on a point
fn quad_at(cx: f32, cy: f32, half: f32) -> [f32; 8] {
    [
        cx - half, cy - half,
        cx + half, cy - half,
        cx + half, cy + half,
        cx - half, cy + half,
    ]
}

const FULL_UVS: [f32; 8] = [0.0, 1.0, 1.0, 1.0, 1.0, 0.0, 0.0, 0.0];

fn region(name: &str, path: &str, texture: Option<TextureId>, vertices: [f32; 8]) -> Attachment {
    Attachment::Region(RegionAttachment {
        name: name.to_string(),
        path: path.to_string(),
        texture,
        world_vertices: vertices,
        uvs: FULL_UVS,
        color: colors::white(),
    })
}

/// Build the character in its setup pose
pub fn build() -> Skeleton {
    let bones = vec![
        Bone::new("root", 0.0, 0.0).with_length(40.0).with_matrix(0.0, -1.0, 1.0, 0.0),
        Bone::new("hand", 20.0, 30.0).with_length(12.0),
    ];

    let cape = MeshAttachment {
        name: "cape".to_string(),
        path: "hero/cape".to_string(),
        texture: Some(BODY_PAGE),
        world_vertices: vec![-10.0, 35.0, 10.0, 35.0, 14.0, 5.0, 0.0, 0.0, -14.0, 5.0],
        uvs: vec![0.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.5, 1.0, 0.0, 1.0],
        triangles: vec![0, 1, 2, 0, 2, 3, 0, 3, 4],
        color: Color::new(0.8, 0.2, 0.2, 1.0),
    };

    let hitbox = BoundingBoxAttachment {
        name: "hitbox".to_string(),
        vertices: vec![-12.0, 0.0, 12.0, 0.0, 12.0, 45.0, -12.0, 45.0],
        world_vertices: vec![-12.0, 0.0, 12.0, 0.0, 12.0, 45.0, -12.0, 45.0],
    };

    let slots = vec![
        Slot::new("cape", 0).with_attachment(Attachment::Mesh(cape)),
        Slot::new("body", 0).with_attachment(region("body", "hero/body", Some(BODY_PAGE), quad_at(0.0, 25.0, 10.0))),
        Slot::new("spark", HAND_BONE)
            .with_blend_mode(BlendMode::Additive)
            .with_attachment(region("spark", "fx/spark", Some(FX_PAGE), quad_at(20.0, 30.0, 4.0))),
        Slot::new("hitbox", 0).with_attachment(Attachment::BoundingBox(hitbox)),
        // Atlas page not loaded yet; skipped by the renderer.
        Slot::new("hat", 0).with_attachment(region("hat", "hero/hat", None, quad_at(0.0, 40.0, 6.0))),
    ];

    Skeleton::new(bones, slots)
}

/// Swing the hand around the shoulder for a given frame
pub fn pose(skeleton: &mut Skeleton, frame: u32) {
    #[allow(clippy::cast_precision_loss)]
    let angle = (frame as f32 * 15.0).to_radians();
    let (sin, cos) = angle.sin_cos();
    let x = 20.0 * cos;
    let y = 20.0f32.mul_add(sin, 30.0);

    if let Some(hand) = skeleton.bones.get_mut(HAND_BONE) {
        hand.world_x = x;
        hand.world_y = y;
        hand.a = cos;
        hand.b = -sin;
        hand.c = sin;
        hand.d = cos;
    }

    if let Some(Attachment::Region(spark)) = skeleton
        .slots
        .get_mut(SPARK_SLOT)
        .and_then(|slot| slot.attachment.as_mut())
    {
        spark.world_vertices = quad_at(x, y, 4.0);
    }
}
