//! Geometry emission: walks a group's synthesized topology rows and draws mask-layer rectangles
//! per a technology rule deck, then adds implant/nwell coverage, an optional body-tap ring, and
//! a normalized boundary.

use arcstr::ArcStr;
use geometry::prelude::*;

use crate::error::{Error, Result};
use crate::model::{Group, GroupKind, Pin};
use crate::tech::Tech;
use crate::terminal::{TerminalKind, TerminalRef};

/// Layer names and rule values for one group, resolved once from the [`Tech`] deck.
struct Rules {
    grid: f64,
    df: ArcStr,
    im: ArcStr,
    ga: ArcStr,
    tdf: ArcStr,
    tim: ArcStr,
    po: ArcStr,
    co: ArcStr,
    m1: ArcStr,
    nw: ArcStr,

    co_sz: f64,
    ga_spc_ga: f64,
    po_spc_co: f64,
    co_spc_co: f64,

    df_enc_co: f64,
    df_spc_df: f64,
    po_ext_df: f64,
    df_ext_po: f64,

    im_enc_df: f64,
    im_enc_ga: f64,
    im_area: f64,
    im_wid: f64,

    nw_enc_pdf: f64,
    nw_area: f64,

    m1_enc_co: f64,
    m1_enc_coe: f64,

    tim_enc_tdf: f64,
    tdf_enc_tco: f64,
    tim_spc_df: f64,
    im_spc_tdf: f64,
    tim_area: f64,

    tap_spacing_floor: f64,
}

impl Rules {
    fn for_group(tech: &Tech, kind: GroupKind) -> Result<Rules> {
        let (df, im, ga, tdf, tim) = match kind {
            GroupKind::Nmos => ("ndiffusion", "nimplant", "ngate", "pdiffusion", "pimplant"),
            GroupKind::Pmos => ("pdiffusion", "pimplant", "pgate", "ndiffusion", "nimplant"),
            GroupKind::Subckt => unreachable!("Rules::for_group is only called for nmos/pmos groups"),
        };

        Ok(Rules {
            grid: tech.grid()?,
            df: df.into(),
            im: im.into(),
            ga: ga.into(),
            tdf: tdf.into(),
            tim: tim.into(),
            po: "poly".into(),
            co: "contact".into(),
            m1: "metal1".into(),
            nw: "nwell".into(),

            co_sz: tech.min_size("contact")?,
            ga_spc_ga: tech.min_spacing(ga, ga)?,
            po_spc_co: tech.min_spacing("poly", "contact")?,
            co_spc_co: tech.min_spacing("contact", "contact")?,

            df_enc_co: tech.min_enclosure(df, "contact")?,
            df_spc_df: tech.min_spacing(df, df)?,
            po_ext_df: tech.min_extension("poly", df)?,
            df_ext_po: tech.min_extension(df, "poly")?,

            im_enc_df: tech.min_enclosure(im, df)?,
            im_enc_ga: tech.min_enclosure(im, ga)?,
            im_area: tech.min_area(im)?,
            im_wid: tech.min_width(im)?,

            nw_enc_pdf: tech.min_enclosure("nwell", "pdiffusion")?,
            nw_area: tech.min_area("nwell")?,

            m1_enc_co: tech.min_enclosure("metal1", "contact")?,
            m1_enc_coe: tech.min_enclosure_qualified("metal1", "contact", "end")?,

            tim_enc_tdf: tech.min_enclosure_qualified(tim, tdf, "tap")?,
            tdf_enc_tco: tech.min_enclosure_qualified(tdf, "contact", "tap")?,
            tim_spc_df: tech.min_spacing_tap_or_zero(tim, df),
            im_spc_tdf: tech.min_spacing_tap_or_zero(im, tdf),
            tim_area: tech.min_area(tim)?,

            tap_spacing_floor: tech.tap_spacing_floor,
        })
    }
}

fn init_shape_layers(r: &Rules, group: &mut Group) {
    let mut layers = vec![r.df.clone(), r.im.clone(), r.po.clone(), r.co.clone(), r.m1.clone(), r.tdf.clone(), r.tim.clone()];
    if group.kind == GroupKind::Pmos {
        layers.push(r.nw.clone());
    }
    for layer in layers {
        group.shape.entry(layer).or_default();
    }
}

/// A diffusion rectangle plus its contact array and covering metal1, the shape produced by three
/// of the five row-position cases (leading diffusion, diffusion-after-gate, diffusion-after-diffusion).
struct DiffContactMetal {
    df: Rect,
    cos: Vec<Rect>,
    m1: Rect,
}

fn diff_with_contacts(r: &Rules, df_x0: f64, df_y1: f64) -> DiffContactMetal {
    let df_x1 = df_x0 + r.df_enc_co * 2.0 + r.co_sz;
    let df = Rect::from_sides(df_x0, 0.0, df_x1, df_y1);

    let num_co = (((df_y1 - 0.0) - r.df_enc_co * 2.0 - r.co_sz) / (r.co_sz + r.co_spc_co)).floor() as i64 + 1;
    let enc_co = ((df_y1 - 0.0) - (num_co as f64) * r.co_sz - ((num_co - 1) as f64) * r.co_spc_co) / 2.0;
    let co_x0 = df_x0 + r.df_enc_co;
    let co_x1 = co_x0 + r.co_sz;
    let cos: Vec<Rect> = (0..num_co)
        .map(|k| {
            let co_y0 = enc_co + (k as f64) * (r.co_sz + r.co_spc_co);
            Rect::from_sides(co_x0, co_y0, co_x1, co_y0 + r.co_sz)
        })
        .collect();

    let m1_x0 = co_x0 - r.m1_enc_co;
    let m1_x1 = co_x1 + r.m1_enc_co;
    let m1_y0 = cos.first().expect("contact array is never empty").bot() - r.m1_enc_coe;
    let m1_y1 = cos.last().expect("contact array is never empty").top() + r.m1_enc_coe;
    let m1 = Rect::from_sides(m1_x0, m1_y0, m1_x1, m1_y1);

    DiffContactMetal { df, cos, m1 }
}

/// A diffusion rectangle plus its covering poly gate, the shape produced by the two
/// gate-row-position cases.
struct DiffPoly {
    df: Rect,
    po: Rect,
}

fn diff_with_poly(r: &Rules, df_x0: f64, length: f64, width: f64) -> DiffPoly {
    let df_x1 = df_x0 + length + r.df_ext_po * 2.0;
    let df = Rect::from_sides(df_x0, 0.0, df_x1, width);
    let po_x0 = df_x0 + r.df_ext_po;
    let po_x1 = po_x0 + length;
    let po = Rect::from_sides(po_x0, -r.po_ext_df, po_x1, width + r.po_ext_df);
    DiffPoly { df, po }
}

fn emit_first_diff(r: &Rules, group: &mut Group, curr: &TerminalRef, next: Option<&TerminalRef>) {
    let df_y1 = (r.df_enc_co * 2.0 + r.co_sz).max(next.map(|n| n.width).unwrap_or(0.0));
    let dcm = diff_with_contacts(r, 0.0, df_y1);
    group.push_shape(&r.df, dcm.df);
    for co in &dcm.cos {
        group.push_shape(&r.co, *co);
    }
    group.push_shape(&r.m1, dcm.m1);
    group.pin.push(Pin { net: curr.net.clone(), layer: r.m1.clone(), rect: dcm.m1 });
}

fn emit_diff_gate(r: &Rules, group: &mut Group, curr: &TerminalRef) {
    let co_x1 = group.last_shape_rect(&r.co).right();
    let df_x0 = co_x1 + r.po_spc_co - r.df_ext_po;
    let dp = diff_with_poly(r, df_x0, curr.length, curr.width);
    group.push_shape(&r.df, dp.df);
    group.push_shape(&r.po, dp.po);
    group.pin.push(Pin { net: curr.net.clone(), layer: r.po.clone(), rect: dp.po });
}

fn emit_gate_diff(r: &Rules, group: &mut Group, prev: &TerminalRef, curr: &TerminalRef, next: Option<&TerminalRef>) {
    let po_x1 = group.last_shape_rect(&r.po).right();
    let df_x0 = po_x1 + r.po_spc_co - r.df_enc_co;
    let mut df_y1 = (r.df_enc_co * 2.0 + r.co_sz).max(prev.width);
    if let Some(n) = next {
        if n.kind == TerminalKind::Gate {
            df_y1 = df_y1.max(n.width);
        }
    }
    let dcm = diff_with_contacts(r, df_x0, df_y1);
    group.push_shape(&r.df, dcm.df);
    for co in &dcm.cos {
        group.push_shape(&r.co, *co);
    }
    group.push_shape(&r.m1, dcm.m1);
    group.pin.push(Pin { net: curr.net.clone(), layer: r.m1.clone(), rect: dcm.m1 });
}

fn emit_break_diff(r: &Rules, group: &mut Group, curr: &TerminalRef, next: Option<&TerminalRef>) {
    let df_x1_prev = group.last_shape_rect(&r.df).right();
    let df_x0 = df_x1_prev + r.df_spc_df;
    let df_y1 = (r.df_enc_co * 2.0 + r.co_sz).max(next.map(|n| n.width).unwrap_or(0.0));
    let dcm = diff_with_contacts(r, df_x0, df_y1);
    group.push_shape(&r.df, dcm.df);
    for co in &dcm.cos {
        group.push_shape(&r.co, *co);
    }
    group.push_shape(&r.m1, dcm.m1);
    group.pin.push(Pin { net: curr.net.clone(), layer: r.m1.clone(), rect: dcm.m1 });
}

fn emit_gate_gate(r: &Rules, group: &mut Group, curr: &TerminalRef) {
    let po_x1 = group.last_shape_rect(&r.po).right();
    let df_x0 = po_x1 + r.ga_spc_ga - r.df_ext_po;
    let dp = diff_with_poly(r, df_x0, curr.length, curr.width);
    group.push_shape(&r.df, dp.df);
    group.push_shape(&r.po, dp.po);
    group.pin.push(Pin { net: curr.net.clone(), layer: r.po.clone(), rect: dp.po });
}

fn emit_row(r: &Rules, group: &mut Group, row_idx: usize, row: &[TerminalRef]) -> Result<()> {
    for i in 0..row.len() {
        let curr = row[i].clone();
        let prev = if i > 0 { Some(row[i - 1].clone()) } else { None };
        let next = if i + 1 < row.len() { Some(row[i + 1].clone()) } else { None };

        match (prev.as_ref().map(|p| p.kind), curr.kind) {
            (None, TerminalKind::Diff) => emit_first_diff(r, group, &curr, next.as_ref()),
            (Some(TerminalKind::Diff), TerminalKind::Gate) => emit_diff_gate(r, group, &curr),
            (Some(TerminalKind::Gate), TerminalKind::Diff) => {
                emit_gate_diff(r, group, prev.as_ref().unwrap(), &curr, next.as_ref())
            }
            (Some(TerminalKind::Diff), TerminalKind::Diff) => emit_break_diff(r, group, &curr, next.as_ref()),
            (Some(TerminalKind::Gate), TerminalKind::Gate) => emit_gate_gate(r, group, &curr),
            _ => return Err(crate::error::Error::InvalidNodeSequence { row: row_idx, position: i }),
        }
    }
    Ok(())
}

/// Scales `rect` up isotropically about its own center until its area meets `min_area`, then
/// snaps each corner to `grid`. Fixes an asymmetric-growth bug in the distilled source's area
/// healing, which recomputed one corner from an already-mutated coordinate.
fn heal_area(rect: Rect, min_area: f64, grid: f64) -> Rect {
    let area = rect.area();
    if area >= min_area {
        return rect;
    }
    let scale = (min_area / area).sqrt();
    let half_w = rect.width() * scale / 2.0;
    let half_h = rect.height() * scale / 2.0;
    let center = rect.center();
    Rect::from_sides(
        snap_to_grid(center.x - half_w, grid),
        snap_to_grid(center.y - half_h, grid),
        snap_to_grid(center.x + half_w, grid),
        snap_to_grid(center.y + half_h, grid),
    )
}

fn insert_implant(r: &Rules, group: &mut Group) {
    let diffs: Vec<Rect> = group.shape.get(&r.df).cloned().unwrap_or_default().into_iter().map(|s| s.rect).collect();
    let y_inflation = r.im_enc_df.max(r.im_enc_ga);
    for d in &diffs {
        let rect = Rect::from_sides(
            d.left() - r.im_enc_df,
            d.bot() - y_inflation,
            d.right() + r.im_enc_df,
            d.top() + y_inflation,
        );
        group.push_shape(&r.im, rect);
    }

    if let Some(merged) = group.shape.get(&r.im).and_then(|v| v.as_slice().bbox()) {
        let healed = heal_area(merged, r.im_area, r.grid);
        group.shape.insert(r.im.clone(), vec![crate::model::Shape { layer: r.im.clone(), rect: healed }]);
    }
}

fn insert_nwell(r: &Rules, group: &mut Group) {
    if group.kind != GroupKind::Pmos {
        return;
    }
    let mut diffs: Vec<Rect> = group.shape.get(&r.df).cloned().unwrap_or_default().into_iter().map(|s| s.rect).collect();
    diffs.extend(group.shape.get(&r.tdf).cloned().unwrap_or_default().into_iter().map(|s| s.rect));

    for d in &diffs {
        let rect = Rect::from_sides(
            d.left() - r.nw_enc_pdf,
            d.bot() - r.nw_enc_pdf,
            d.right() + r.nw_enc_pdf,
            d.top() + r.nw_enc_pdf,
        );
        group.push_shape(&r.nw, rect);
    }

    if let Some(merged) = group.shape.get(&r.nw).and_then(|v| v.as_slice().bbox()) {
        let healed = heal_area(merged, r.nw_area, r.grid);
        group.shape.insert(r.nw.clone(), vec![crate::model::Shape { layer: r.nw.clone(), rect: healed }]);
    }
}

fn tap_contacts_horizontal(r: &Rules, tdf: Rect) -> Vec<Rect> {
    let num_co =
        (((tdf.width()) - r.tdf_enc_tco * 2.0 - r.co_sz) / (r.co_sz + r.co_spc_co)).floor() as i64 + 1;
    let enc_x = (tdf.width() - (num_co as f64) * r.co_sz - ((num_co - 1) as f64) * r.co_spc_co) / 2.0;
    let enc_y = (tdf.height() - r.co_sz) / 2.0;
    let y0 = tdf.bot() + enc_y;
    let y1 = tdf.top() - enc_y;
    (0..num_co)
        .map(|k| {
            let x0 = tdf.left() + enc_x + (k as f64) * (r.co_sz + r.co_spc_co);
            Rect::from_sides(x0, y0, x0 + r.co_sz, y1)
        })
        .collect()
}

fn tap_contacts_vertical(r: &Rules, tdf: Rect) -> Vec<Rect> {
    let num_co =
        (((tdf.height()) - r.tdf_enc_tco * 2.0 - r.co_sz) / (r.co_sz + r.co_spc_co)).floor() as i64 + 1;
    let enc_y = (tdf.height() - (num_co as f64) * r.co_sz - ((num_co - 1) as f64) * r.co_spc_co) / 2.0;
    let enc_x = (tdf.width() - r.co_sz) / 2.0;
    let x0 = tdf.left() + enc_x;
    let x1 = tdf.right() - enc_x;
    (0..num_co)
        .map(|k| {
            let y0 = tdf.bot() + enc_y + (k as f64) * (r.co_sz + r.co_spc_co);
            Rect::from_sides(x0, y0, x1, y0 + r.co_sz)
        })
        .collect()
}

/// Per-side body-tap geometry, built before the group's accumulated shapes are updated so that
/// the right/left passes can still reach back and adjust a previously built top/bottom side.
#[derive(Default)]
struct TapSide {
    tim: Option<Rect>,
    tdf: Option<Rect>,
    tco: Vec<Rect>,
    m1: Option<Rect>,
    pin: Option<Pin>,
}

fn build_tap_ring(r: &Rules, group: &mut Group) -> Result<()> {
    let sides_str = group.constraint.tap.clone();
    if sides_str.trim().is_empty() {
        return Ok(());
    }
    let sides: Vec<String> = sides_str.split(',').map(|s| s.trim().to_string()).collect();
    let has = |s: &str| sides.iter().any(|x| x == s);

    let body_net = group
        .instances
        .first()
        .ok_or_else(|| Error::EmptyGroup { group: group.name.clone() })?
        .bulk()?;
    let dist = r.tim_spc_df.max(r.im_spc_tdf - r.tim_enc_tdf).max(r.tap_spacing_floor);

    let df_shapes = group.shape.get(&r.df).cloned().unwrap_or_default();
    let df_x0 = df_shapes.first().map(|s| s.rect.left()).unwrap_or(0.0);
    let df_x1 = df_shapes.last().map(|s| s.rect.right()).unwrap_or(0.0);
    let df_y0 = df_shapes.first().map(|s| s.rect.bot()).unwrap_or(0.0);
    let df_y1 = df_shapes.last().map(|s| s.rect.top()).unwrap_or(0.0);
    let im_rect = group
        .shape
        .get(&r.im)
        .and_then(|v| v.first())
        .map(|s| s.rect)
        .expect("implant must be merged before the tap ring is built");

    let mut top = TapSide::default();
    let mut btm = TapSide::default();
    let mut rgt = TapSide::default();
    let mut lft = TapSide::default();

    if has("t") {
        let mut tim_y0 = im_rect.top() + dist;
        let mut tim_y1 = tim_y0 + r.tim_enc_tdf * 2.0 + r.tdf_enc_tco * 2.0 + r.co_sz;
        let tim_x0 = df_x0 - r.tim_enc_tdf;
        let tim_x1 = df_x1 + r.tim_enc_tdf;
        if tim_y1 - tim_y0 < r.im_wid {
            tim_y1 = snap_to_grid(tim_y0 + r.im_wid, r.grid);
        }
        if !has("r") && !has("l") && (tim_y1 - tim_y0) * (tim_x1 - tim_x0) < r.tim_area {
            tim_y1 = snap_to_grid(tim_y0 + r.tim_area / (tim_x1 - tim_x0), r.grid);
        }
        let tim = Rect::from_sides(tim_x0, tim_y0, tim_x1, tim_y1);

        let tdf = Rect::from_sides(df_x0, tim_y0 + r.tim_enc_tdf, df_x1, tim_y1 - r.tim_enc_tdf);
        let tco = tap_contacts_horizontal(r, tdf);
        let m1 = Rect::from_sides(
            tco.first().unwrap().left() - r.m1_enc_coe,
            tco[0].bot() - r.m1_enc_co,
            tco.last().unwrap().right() + r.m1_enc_coe,
            tco[0].top() + r.m1_enc_co,
        );
        top = TapSide {
            tim: Some(tim),
            tdf: Some(tdf),
            tco,
            m1: Some(m1),
            pin: Some(Pin { net: body_net.clone(), layer: r.m1.clone(), rect: m1 }),
        };
    }

    if has("b") {
        let mut tim_y1 = im_rect.bot() - dist;
        let mut tim_y0 = tim_y1 - r.tim_enc_tdf * 2.0 - r.tdf_enc_tco * 2.0 - r.co_sz;
        let tim_x0 = df_x0 - r.tim_enc_tdf;
        let tim_x1 = df_x1 + r.tim_enc_tdf;
        if tim_y1 - tim_y0 < r.im_wid {
            tim_y0 = snap_to_grid(tim_y1 - r.im_wid, r.grid);
        }
        if !has("r") && !has("l") && (tim_y1 - tim_y0) * (tim_x1 - tim_x0) < r.tim_area {
            tim_y0 = snap_to_grid(tim_y1 - r.tim_area / (tim_x1 - tim_x0), r.grid);
        }
        let tim = Rect::from_sides(tim_x0, tim_y0, tim_x1, tim_y1);

        let tdf = Rect::from_sides(df_x0, tim_y0 + r.tim_enc_tdf, df_x1, tim_y1 - r.tim_enc_tdf);
        let tco = tap_contacts_horizontal(r, tdf);
        let m1 = Rect::from_sides(
            tco.first().unwrap().left() - r.m1_enc_coe,
            tco[0].bot() - r.m1_enc_co,
            tco.last().unwrap().right() + r.m1_enc_coe,
            tco[0].top() + r.m1_enc_co,
        );
        btm = TapSide {
            tim: Some(tim),
            tdf: Some(tdf),
            tco,
            m1: Some(m1),
            pin: Some(Pin { net: body_net.clone(), layer: r.m1.clone(), rect: m1 }),
        };
    }

    if has("r") {
        let mut tim_x0 = im_rect.right() + dist;
        let mut tim_x1 = tim_x0 + r.tim_enc_tdf * 2.0 + r.tdf_enc_tco * 2.0 + r.co_sz;
        let mut tim_y0 = df_y0 - r.tim_enc_tdf;
        let mut tim_y1 = df_y1 + r.tim_enc_tdf;
        if tim_x1 - tim_x0 < r.im_wid {
            tim_x1 = snap_to_grid(tim_x0 + r.im_wid, r.grid);
        }

        if has("t") || has("b") {
            for side in [&mut top, &mut btm] {
                if let Some(shp) = side.tim {
                    if shp.top() < tim_y0 {
                        tim_y0 = shp.top();
                    }
                    if shp.bot() > tim_y1 {
                        tim_y1 = shp.bot();
                    }
                    side.tim = Some(Rect::from_sides(shp.left(), shp.bot(), tim_x1, shp.top()));
                }
            }
        } else if (tim_y1 - tim_y0) * (tim_x1 - tim_x0) < r.tim_area {
            tim_x1 = snap_to_grid(tim_x0 + r.tim_area / (tim_y1 - tim_y0), r.grid);
        }
        let tim = Rect::from_sides(tim_x0, tim_y0, tim_x1, tim_y1);

        let tdf_x0 = tim_x0 + r.tim_enc_tdf;
        let tdf_x1 = tim_x1 - r.tim_enc_tdf;
        let mut tdf_y0 = df_y0;
        let mut tdf_y1 = df_y1;
        if has("t") || has("b") {
            for side in [&mut top, &mut btm] {
                if let Some(shp) = side.tdf {
                    if shp.top() < tdf_y0 {
                        tdf_y0 = shp.top();
                    }
                    if shp.bot() > tdf_y1 {
                        tdf_y1 = shp.bot();
                    }
                    side.tdf = Some(Rect::from_sides(shp.left(), shp.bot(), tdf_x1, shp.top()));
                }
            }
        }
        let tdf = Rect::from_sides(tdf_x0, tdf_y0, tdf_x1, tdf_y1);
        let tco = tap_contacts_vertical(r, tdf);

        let tco_x0 = tco[0].left();
        let tco_x1 = tco[0].right();
        let mut m1_y0 = tco.first().unwrap().bot() - r.m1_enc_coe;
        let mut m1_y1 = tco.last().unwrap().top() + r.m1_enc_coe;
        let m1_x0 = tco_x0 - r.m1_enc_co;
        let m1_x1 = tco_x1 + r.m1_enc_co;

        if has("t") || has("b") {
            for side in [&mut top, &mut btm] {
                if let Some(shp) = side.m1 {
                    if shp.top() < m1_y0 {
                        m1_y0 = shp.top();
                    }
                    if shp.bot() > m1_y1 {
                        m1_y1 = shp.bot();
                    }
                    side.m1 = Some(Rect::from_sides(shp.left(), shp.bot(), m1_x1, shp.top()));
                }
                if let Some(pin) = side.pin {
                    side.pin = Some(Pin { rect: Rect::from_sides(pin.rect.left(), pin.rect.bot(), m1_x1, pin.rect.top()), ..pin });
                }
            }
        }
        let m1 = Rect::from_sides(m1_x0, m1_y0, m1_x1, m1_y1);
        rgt = TapSide { tim: Some(tim), tdf: Some(tdf), tco, m1: Some(m1), pin: Some(Pin { net: body_net.clone(), layer: r.m1.clone(), rect: m1 }) };
    }

    if has("l") {
        let mut tim_x1 = im_rect.left() - dist;
        let mut tim_x0 = tim_x1 - r.tim_enc_tdf * 2.0 - r.tdf_enc_tco * 2.0 - r.co_sz;
        let mut tim_y0 = df_y0 - r.tim_enc_tdf;
        let mut tim_y1 = df_y1 + r.tim_enc_tdf;
        if tim_x1 - tim_x0 < r.im_wid {
            tim_x0 = snap_to_grid(tim_x1 - r.im_wid, r.grid);
        }

        if has("t") || has("b") {
            for side in [&mut top, &mut btm] {
                if let Some(shp) = side.tim {
                    if shp.top() < tim_y0 {
                        tim_y0 = shp.top();
                    }
                    if shp.bot() > tim_y1 {
                        tim_y1 = shp.bot();
                    }
                    side.tim = Some(Rect::from_sides(tim_x0, shp.bot(), shp.right(), shp.top()));
                }
            }
        } else if (tim_y1 - tim_y0) * (tim_x1 - tim_x0) < r.tim_area {
            tim_x0 = snap_to_grid(tim_x1 - r.tim_area / (tim_y1 - tim_y0), r.grid);
        }
        let tim = Rect::from_sides(tim_x0, tim_y0, tim_x1, tim_y1);

        let tdf_x0 = tim_x0 + r.tim_enc_tdf;
        let tdf_x1 = tim_x1 - r.tim_enc_tdf;
        let mut tdf_y0 = df_y0;
        let mut tdf_y1 = df_y1;
        if has("t") || has("b") {
            for side in [&mut top, &mut btm] {
                if let Some(shp) = side.tdf {
                    if shp.top() < tdf_y0 {
                        tdf_y0 = shp.top();
                    }
                    if shp.bot() > tdf_y1 {
                        tdf_y1 = shp.bot();
                    }
                    side.tdf = Some(Rect::from_sides(tdf_x0, shp.bot(), shp.right(), shp.top()));
                }
            }
        }
        let tdf = Rect::from_sides(tdf_x0, tdf_y0, tdf_x1, tdf_y1);
        let tco = tap_contacts_vertical(r, tdf);

        let tco_x0 = tco[0].left();
        let tco_x1 = tco[0].right();
        let mut m1_y0 = tco.first().unwrap().bot() - r.m1_enc_coe;
        let mut m1_y1 = tco.last().unwrap().top() + r.m1_enc_coe;
        let m1_x0 = tco_x0 - r.m1_enc_co;
        let m1_x1 = tco_x1 + r.m1_enc_co;

        if has("t") || has("b") {
            for side in [&mut top, &mut btm] {
                if let Some(shp) = side.m1 {
                    if shp.top() < m1_y0 {
                        m1_y0 = shp.top();
                    }
                    if shp.bot() > m1_y1 {
                        m1_y1 = shp.bot();
                    }
                    side.m1 = Some(Rect::from_sides(m1_x0, shp.bot(), shp.right(), shp.top()));
                }
                if let Some(pin) = side.pin {
                    side.pin = Some(Pin { rect: Rect::from_sides(m1_x0, pin.rect.bot(), pin.rect.right(), pin.rect.top()), ..pin });
                }
            }
        }
        let m1 = Rect::from_sides(m1_x0, m1_y0, m1_x1, m1_y1);
        lft = TapSide { tim: Some(tim), tdf: Some(tdf), tco, m1: Some(m1), pin: Some(Pin { net: body_net, layer: r.m1.clone(), rect: m1 }) };
    }

    for side in [&top, &btm, &rgt, &lft] {
        if let Some(tim) = side.tim {
            group.push_shape(&r.tim, tim);
        }
        if let Some(tdf) = side.tdf {
            group.push_shape(&r.tdf, tdf);
        }
        for co in &side.tco {
            group.push_shape(&r.co, *co);
        }
        if let Some(m1) = side.m1 {
            group.push_shape(&r.m1, m1);
        }
        if let Some(pin) = side.pin {
            group.pin.push(pin);
        }
    }

    Ok(())
}

fn normalize_origin(group: &mut Group) {
    // The boundary is sized from implant coverage alone: the group's own implant layer plus
    // whichever of the two implant layers its (possibly absent) tap ring used.
    let mut rects: Vec<Rect> = Vec::new();
    for layer in ["nimplant", "pimplant"] {
        if let Some(shapes) = group.shape.get(layer) {
            rects.extend(shapes.iter().map(|s| s.rect));
        }
    }
    let merged = match rects.as_slice().bbox() {
        Some(b) => b,
        None => return,
    };

    let pad = 0.5;
    let x0 = merged.left() - pad;
    let y0 = merged.bot() - pad;
    let x1 = merged.right() + pad;
    let y1 = merged.top() + pad;

    for shapes in group.shape.values_mut() {
        for s in shapes.iter_mut() {
            s.rect = s.rect.translate(-x0, -y0);
        }
    }
    for pin in group.pin.iter_mut() {
        pin.rect = pin.rect.translate(-x0, -y0);
    }

    let boundary = Rect::from_sides(0.0, 0.0, x1 - x0, y1 - y0);
    group.shape.insert("boundary".into(), vec![crate::model::Shape { layer: "boundary".into(), rect: boundary }]);
    group.boundary = Some(boundary);
}

/// Generates `group.shape`, `group.pin`, and `group.boundary` from `group.topology`.
pub fn generate_layout(tech: &Tech, group: &mut Group) -> Result<()> {
    let r = Rules::for_group(tech, group.kind)?;
    init_shape_layers(&r, group);

    let rows = group.topology.clone();
    for (row_idx, row) in rows.into_iter().enumerate() {
        emit_row(&r, group, row_idx, &row)?;
    }

    insert_implant(&r, group);
    build_tap_ring(&r, group)?;
    insert_nwell(&r, group);
    normalize_origin(group);

    Ok(())
}
