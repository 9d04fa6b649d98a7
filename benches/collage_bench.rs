use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use dialog_collage::codec::{parse_fragment, ConfigCodec};
use dialog_collage::rendering::SceneLayout;
use dialog_collage::{Configuration, Defaults, Kerning, Scene, ViewTransform};

fn sample_config() -> Configuration {
    Configuration {
        text: "IT'S DANGEROUS TO GO ALONE! TAKE THIS.".to_string(),
        font_size: 30,
        kerning: Kerning::new("0.050"),
        alt_background: true,
        alt_background_opacity: 70,
        view: ViewTransform::new(-812.25, -96.5, 2.75),
    }
}

fn bench_codec(c: &mut Criterion) {
    let codec = ConfigCodec::new(Arc::new(Defaults::default()));
    let config = sample_config();
    let fragment = codec.encode_fragment(&config);

    c.bench_function("encode_fragment", |b| {
        b.iter(|| codec.encode_fragment(black_box(&config)))
    });
    c.bench_function("decode_fragment", |b| {
        b.iter(|| codec.decode_fragment(black_box(&fragment)))
    });
    c.bench_function("parse_fragment", |b| b.iter(|| parse_fragment(black_box(&fragment))));
}

fn bench_scene(c: &mut Criterion) {
    let mut scene = Scene::new(SceneLayout::default(), "monospace");
    scene.apply(&sample_config()).expect("default layout has a dialog box");

    c.bench_function("scene_to_svg", |b| b.iter(|| black_box(&scene).to_svg()));
}

criterion_group!(benches, bench_codec, bench_scene);
criterion_main!(benches);
