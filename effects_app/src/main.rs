//! Effects demo application
//!
//! Drives the command renderer without a GPU: a handful of simulated
//! objects orbit the origin while shapes are submitted from the main
//! thread and a producer thread, and a counting batch consumer stands in
//! for the host graphics layer. Run with `RUST_LOG=debug` to watch the
//! per-frame totals.

use std::collections::HashMap;
use std::time::Instant;

use draw_engine::prelude::*;
use rand::prelude::*;

// Simulation constants
const FRAME_COUNT: u32 = 120;
const ORBITER_COUNT: u64 = 4;
const BURST_SIZE: usize = 24;

/// Host world stand-in: objects circling the origin at fixed speeds
struct OrbitWorld {
    objects: HashMap<ObjectId, (Vec3, Vec3)>, // (previous, current)
    tick: u32,
}

impl OrbitWorld {
    fn new() -> Self {
        let mut world = Self {
            objects: HashMap::new(),
            tick: 0,
        };
        for index in 0..ORBITER_COUNT {
            let position = Self::orbit_position(index, 0);
            world.objects.insert(ObjectId(index), (position, position));
        }
        world
    }

    fn orbit_position(index: u64, tick: u32) -> Vec3 {
        let radius = 6.0 + index as f32 * 2.0;
        let angle = tick as f32 * 0.05 + index as f32;
        Vec3::new(
            radius * angle.cos(),
            1.0 + index as f32 * 0.5,
            radius * angle.sin(),
        )
    }

    fn step(&mut self) {
        self.tick += 1;
        for (id, entry) in &mut self.objects {
            entry.0 = entry.1;
            entry.1 = Self::orbit_position(id.0, self.tick);
        }
    }
}

impl ObjectProvider for OrbitWorld {
    fn lookup(&self, id: ObjectId) -> Option<ObjectState> {
        self.objects.get(&id).map(|(prev, current)| ObjectState {
            position: *current,
            prev_position: *prev,
        })
    }
}

/// Batch consumer that counts what a GPU backend would upload
#[derive(Default)]
struct CountingSink {
    triangles: usize,
    textured_triangles: usize,
    texture_binds: usize,
}

impl BatchConsumer for CountingSink {
    fn draw_triangles(&mut self, batch: &TriangleBatch) {
        self.triangles += batch.triangle_count();
    }

    fn draw_textured(&mut self, batch: &TexturedBatch) {
        self.texture_binds += 1;
        self.textured_triangles += batch.triangle_count();
    }
}

fn random_color(rng: &mut impl Rng) -> Color {
    Color::from_argb(0xFF, rng.gen(), rng.gen(), rng.gen())
}

fn submit_scene(submitter: &ShapeSubmitter, rng: &mut impl Rng) -> Result<(), SubmitError> {
    // Persistent ground grid, cleared only on shutdown.
    for i in -5i32..=5 {
        let offset = i as f32 * 2.0;
        submitter.draw_line(
            PointRef::Literal(Vec3::new(offset, 0.0, -10.0)),
            PointRef::Literal(Vec3::new(offset, 0.0, 10.0)),
            Color::from_argb(0xFF, 0x40, 0x40, 0x40),
            Thickness::Pixels(1.0),
            Lifetime::Persistent,
            DrawTransform::identity(),
        )?;
        submitter.draw_line(
            PointRef::Literal(Vec3::new(-10.0, 0.0, offset)),
            PointRef::Literal(Vec3::new(10.0, 0.0, offset)),
            Color::from_argb(0xFF, 0x40, 0x40, 0x40),
            Thickness::Pixels(1.0),
            Lifetime::Persistent,
            DrawTransform::identity(),
        )?;
    }

    // One sphere per orbiter, interpolated against the object position.
    for index in 0..ORBITER_COUNT {
        submitter.draw_sphere(
            PointRef::Anchored(Attachment::to_object(ObjectId(index))),
            0.75,
            16,
            20,
            random_color(rng),
            Lifetime::Persistent,
            DrawTransform::identity(),
        )?;
    }

    // A camera-facing marker quad above the first orbiter.
    submitter.draw_textured_quad(
        PointRef::Anchored(Attachment::with_offset(
            ObjectId(0),
            Vec3::new(0.0, 2.0, 0.0),
        )),
        1.5,
        1.5,
        TextureId(7),
        Color::WHITE,
        true,
        Lifetime::Persistent,
        DrawTransform::identity(),
    )?;

    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut renderer = ShapeRenderer::new(RendererConfig::default());
    let marker = renderer.register_wireframe(WireframeShape::unit_box_edges("marker box"))?;

    let mut rng = rand::thread_rng();
    let submitter = renderer.submitter();
    submit_scene(&submitter, &mut rng)?;

    // A second producer on its own thread, the way simulation or
    // network handlers submit mid-frame in a real host.
    let burst_submitter = renderer.submitter();
    let producer = std::thread::spawn(move || {
        let mut rng = rand::thread_rng();
        for _ in 0..BURST_SIZE {
            let position = Vec3::new(
                rng.gen_range(-8.0..8.0),
                rng.gen_range(0.0..4.0),
                rng.gen_range(-8.0..8.0),
            );
            let result = burst_submitter.draw_wireframe(
                marker,
                PointRef::Literal(position),
                Color::from_argb(0xFF, 0xFF, 0xA0, 0x20),
                Thickness::Pixels(2.0),
                Lifetime::Ticks(60),
                DrawTransform::from_yaw_degrees(rng.gen_range(0.0..360.0)),
            );
            if let Err(error) = result {
                log::warn!("burst submission rejected: {error}");
            }
        }
    });
    producer.join().expect("producer thread");

    let mut world = OrbitWorld::new();
    let started = Instant::now();
    let mut total_triangles = 0usize;

    for frame in 0..FRAME_COUNT {
        world.step();
        let ctx = FrameContext::new(Vec3::new(0.0, 6.0, 18.0), 70.0, 1080, 0.5);

        let mut sink = CountingSink::default();
        renderer.render_frame(&ctx, &world, &mut sink);
        total_triangles += sink.triangles + sink.textured_triangles;

        log::debug!(
            "frame {frame}: {} solid tris, {} textured tris over {} binds, {} live commands",
            sink.triangles,
            sink.textured_triangles,
            sink.texture_binds,
            renderer.live_count(),
        );
    }

    log::info!(
        "{FRAME_COUNT} frames in {:.2?}, {total_triangles} triangles total, {} live commands remain",
        started.elapsed(),
        renderer.live_count(),
    );

    renderer.clear_all();
    Ok(())
}
