//! Shading-language built-ins with GPU semantics, for the CPU evaluators.

pub type Vec2 = [f32; 2];
pub type Vec3 = [f32; 3];

/// Hermite threshold. Edges may be reversed (`edge0 > edge1`) to get a falling
/// curve, matching GLSL/MSL behaviour.
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let d = edge1 - edge0;
    if d == 0.0 {
        return if x < edge0 { 0.0 } else { 1.0 };
    }
    let t = ((x - edge0) / d).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

pub fn mix(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

pub fn mix3(a: Vec3, b: Vec3, t: f32) -> Vec3 {
    [mix(a[0], b[0], t), mix(a[1], b[1], t), mix(a[2], b[2], t)]
}

pub fn scale3(v: Vec3, s: f32) -> Vec3 {
    [v[0] * s, v[1] * s, v[2] * s]
}

pub fn add3(a: Vec3, b: Vec3) -> Vec3 {
    [a[0] + b[0], a[1] + b[1], a[2] + b[2]]
}

pub fn dot2(a: Vec2, b: Vec2) -> f32 {
    a[0] * b[0] + a[1] * b[1]
}

pub fn length2(v: Vec2) -> f32 {
    dot2(v, v).sqrt()
}

pub fn distance2(a: Vec2, b: Vec2) -> f32 {
    length2([a[0] - b[0], a[1] - b[1]])
}

/// `sign()` as the shading languages define it: 0 maps to 0.
pub fn sign(x: f32) -> f32 {
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// Divide component-wise, treating a zero divisor as 1 so a collapsed surface
/// does not produce NaN.
pub fn normalize_coord(frag: Vec2, resolution: Vec2) -> Vec2 {
    let rx = if resolution[0] > 0.0 { resolution[0] } else { 1.0 };
    let ry = if resolution[1] > 0.0 { resolution[1] } else { 1.0 };
    [frag[0] / rx, frag[1] / ry]
}

/// Signed distance to a five-pointed star with outer radius `r_outer`; the
/// inner vertices sit at `r_inner_ratio` of the outer radius.
pub fn sd_star5(p: Vec2, r_outer: f32, r_inner_ratio: f32) -> f32 {
    const K1: Vec2 = [0.809_016_994_375, -0.587_785_252_292];
    const K2: Vec2 = [-K1[0], K1[1]];

    let mut p = [p[0].abs(), p[1]];
    let d1 = 2.0 * dot2(K1, p).max(0.0);
    p = [p[0] - d1 * K1[0], p[1] - d1 * K1[1]];
    let d2 = 2.0 * dot2(K2, p).max(0.0);
    p = [p[0] - d2 * K2[0], p[1] - d2 * K2[1]];
    p[0] = p[0].abs();

    p[1] -= r_outer;

    let ba = [
        r_inner_ratio * r_outer * -K1[1],
        r_inner_ratio * r_outer * K1[0] - 1.0,
    ];
    let h = (dot2(p, ba) / dot2(ba, ba)).clamp(0.0, 1.0);

    let d = length2([p[0] - ba[0] * h, p[1] - ba[1] * h]);
    let s = sign(p[1] * ba[0] - p[0] * ba[1]);
    d * s
}

/// Linear float color to RGBA8, clamped.
pub fn to_rgba8(c: Vec3) -> [u8; 4] {
    let q = |v: f32| (v.clamp(0.0, 1.0) * 255.0 + 0.5) as u8;
    [q(c[0]), q(c[1]), q(c[2]), 255]
}
