use anyhow::Result;
use pringles::{Atomic, AtomicKind, Coupled, CoupledBuilder, Model, PortOwner};
use serde_json::json;

fn interacciones_poblacion() -> Result<Coupled> {
    let foco_kind = AtomicKind::builder().with_name("Foco").build()?;
    let contagio_kind = AtomicKind::builder().with_name("Contagio").build()?;

    let mut foco = foco_kind
        .instantiate("foco")
        .with_param("mean", 2)
        .with_param("std", 1);
    foco.add_inport("in").add_outport("out");

    let mut contagio = contagio_kind
        .instantiate("contagio")
        .with_param("threshold_NV", 30)
        .with_param("threshold_V", 80);
    contagio.add_inport("in").add_outport("out");

    let foco_in = foco.get_port("in")?;
    let foco_out = foco.get_port("out")?;
    let contagio_in = contagio.get_port("in")?;
    let contagio_out = contagio.get_port("out")?;

    let mut coupled = Coupled::new("interacciones_poblacion", vec![foco.into(), contagio.into()]);
    coupled.add_inport("in_port").add_outport("out_port");
    let in_port = coupled.get_port("in_port")?;
    let out_port = coupled.get_port("out_port")?;
    coupled
        .add_coupling(&in_port, &foco_in)?
        .add_coupling(&foco_out, &contagio_in)?
        .add_coupling(&contagio_out, &out_port)?;
    Ok(coupled)
}

const INTERACCIONES_POBLACION_MA: &str = "[interacciones_poblacion]\n\
components: foco@Foco contagio@Contagio\n\
out: out_port\n\
in: in_port\n\
link: in_port in@foco\n\
link: out@foco in@contagio\n\
link: out@contagio out_port\n\
\n\
\n\
[foco]\n\
mean: 2\n\
std: 1\n\
\n\
\n\
[contagio]\n\
threshold_NV: 30\n\
threshold_V: 80\n";

#[test]
fn test_empty_top_model_to_ma() {
    let top: Model = Coupled::new("top", vec![]).into();
    assert_eq!(top.to_ma(), "[top]\ncomponents: \nout: \nin: \n");
}

#[test]
fn test_epidemiology_model_to_ma() -> Result<()> {
    let model: Model = interacciones_poblacion()?.into();
    assert_eq!(model.to_ma(), INTERACCIONES_POBLACION_MA);
    Ok(())
}

#[test]
fn test_to_ma_is_stable_across_calls() -> Result<()> {
    let model: Model = interacciones_poblacion()?.into();
    assert_eq!(model.to_ma(), model.to_ma());
    Ok(())
}

#[test]
fn test_builder_and_direct_couplings_agree() -> Result<()> {
    let foco_kind = AtomicKind::builder()
        .with_name("Foco")
        .with_input_port("in")
        .with_output_port("out")
        .build()?;
    let contagio_kind = AtomicKind::builder()
        .with_name("Contagio")
        .with_input_port("in")
        .with_output_port("out")
        .build()?;

    let built = CoupledBuilder::new("interacciones_poblacion")
        .inport("in_port")
        .outport("out_port")
        .component(
            foco_kind
                .instantiate("foco")
                .with_param("mean", 2)
                .with_param("std", 1),
        )
        .component(
            contagio_kind
                .instantiate("contagio")
                .with_param("threshold_NV", 30)
                .with_param("threshold_V", 80),
        )
        .coupling("in_port", "in@foco".parse::<pringles::PortRef>()?)
        .coupling("out@foco".parse::<pringles::PortRef>()?, "in@contagio".parse::<pringles::PortRef>()?)
        .coupling("out@contagio".parse::<pringles::PortRef>()?, "out_port")
        .build()?;

    assert_eq!(Model::from(built).to_ma(), INTERACCIONES_POBLACION_MA);
    Ok(())
}

#[test]
fn test_json_omits_model_for_boundary_ports() -> Result<()> {
    let dict = Model::from(interacciones_poblacion()?).to_dict();

    assert_eq!(dict["id"], "interacciones_poblacion");
    assert_eq!(dict["type"], "coupled");
    assert_eq!(dict["models"].as_array().map(Vec::len), Some(2));

    let eic = &dict["eic"][0];
    assert_eq!(eic["from_port"], "in_port");
    assert!(eic.get("from_model").is_none());
    assert_eq!(eic["to_model"], "foco");

    let ic = &dict["ic"][0];
    assert_eq!(ic["from_model"], "foco");
    assert_eq!(ic["to_model"], "contagio");

    let eoc = &dict["eoc"][0];
    assert_eq!(eoc["from_model"], "contagio");
    assert!(eoc.get("to_model").is_none());
    assert_eq!(eoc["to_port"], "out_port");
    Ok(())
}

#[test]
fn test_json_ic_on_own_ports_keeps_both_models() -> Result<()> {
    let mut top = Coupled::new("top", vec![]);
    top.add_inport("in").add_outport("out");
    top.add_coupling("out", "in")?;

    let dict = Model::from(top).to_dict();
    assert_eq!(
        dict["ic"][0],
        json!({"to_port": "in", "to_model": "top", "from_port": "out", "from_model": "top"})
    );
    Ok(())
}

#[test]
fn test_json_eic_between_subcomponents_omits_from_model() -> Result<()> {
    let mut a = Atomic::new("a");
    a.add_inport("x");
    let mut b = Atomic::new("b");
    b.add_inport("y");
    let (x, y) = (a.get_port("x")?, b.get_port("y")?);

    let mut top = Coupled::new("top", vec![a.into(), b.into()]);
    top.add_coupling(&x, &y)?;

    let dict = Model::from(top).to_dict();
    assert_eq!(dict["eic"][0], json!({"to_port": "y", "to_model": "b", "from_port": "x"}));
    assert!(dict["eic"][0].get("from_model").is_none());
    Ok(())
}

#[test]
fn test_json_key_order() -> Result<()> {
    let json = Model::from(interacciones_poblacion()?).to_json()?;
    let positions: Vec<usize> = ["\"id\"", "\"type\"", "\"models\"", "\"ports\"", "\"eoc\"", "\"eic\"", "\"ic\""]
        .iter()
        .map(|key| json.find(key).unwrap_or(usize::MAX))
        .collect();
    let mut sorted = positions.clone();
    sorted.sort_unstable();
    assert_eq!(positions, sorted);
    Ok(())
}
