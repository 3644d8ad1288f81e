use anyhow::Result;
use camino::Utf8PathBuf;
use nodal_editor::canvas::{DrawOp, RecordingCanvas};
use nodal_editor::editor::{StructureEditor, free_document_path};
use nodal_editor::projection::NodeOwner;
use nodal_editor::samples;
use nodal_editor::structure::{Direction, EndpointRef, SignalType, Structure, StructureDoc};
use tempfile::tempdir;

#[test]
fn first_frame_navigates_exactly_once() {
    let mut editor = StructureEditor::new(Some(samples::m1().unwrap()));
    let mut canvas = RecordingCanvas::new();
    for _ in 0..4 {
        editor.gui(&mut canvas);
    }
    assert_eq!(canvas.navigate_count(), 1);
    assert!(canvas.is_balanced());
}

#[test]
fn editor_scopes_frames_with_its_label() {
    let a = StructureEditor::new(None);
    let b = StructureEditor::new(None);
    assert_ne!(a.label(), b.label());
    assert!(a.label().starts_with("Editor_"));

    let mut a = a;
    let mut canvas = RecordingCanvas::new();
    let report = a.gui(&mut canvas).clone();
    assert_eq!(report.nodes, 0);
    assert_eq!(
        canvas.ops().first(),
        Some(&DrawOp::Begin {
            editor: a.label().to_string()
        })
    );
    assert_eq!(canvas.ops().last(), Some(&DrawOp::End));
}

#[test]
fn absent_structure_draws_no_nodes() {
    let mut editor = StructureEditor::new(None);
    let mut canvas = RecordingCanvas::new();
    editor.gui(&mut canvas);
    assert!(canvas.nodes().is_empty());
    assert_eq!(editor.title(), "(empty)");
    assert!(editor.save().is_err());
}

#[test]
fn confirmed_link_marks_editor_dirty() {
    let mut s = samples::keeper(SignalType::Bit, 0).unwrap();
    s.add_port("tap", Direction::Output, SignalType::Bit).unwrap();
    let mut editor = StructureEditor::new(Some(s));
    let mut canvas = RecordingCanvas::new();
    editor.gui(&mut canvas);
    assert!(!editor.is_dirty());

    let map = editor.pass().id_map();
    let i = map.pin_of(&EndpointRef::port("i")).unwrap();
    let tap = map.pin_of(&EndpointRef::port("tap")).unwrap();
    canvas.script_link(i, tap, true);
    let report = editor.gui(&mut canvas);
    assert_eq!(report.connected.len(), 1);
    assert!(editor.is_dirty());
    assert!(editor.title().ends_with('*'));

    let structure = editor.structure().unwrap();
    let net = structure.net_of(&EndpointRef::port("tap")).unwrap();
    assert!(net.contains(&EndpointRef::port("o")));
}

#[test]
fn selection_maps_to_graph_objects() {
    let mut editor = StructureEditor::new(Some(samples::m1().unwrap()));
    let mut canvas = RecordingCanvas::new();
    editor.gui(&mut canvas);

    let map = editor.pass().id_map();
    let y = map.node_of(&NodeOwner::Instance("y".into())).unwrap();
    let t = map.node_of(&NodeOwner::Port("t".into())).unwrap();
    canvas.select(vec![t, y]);
    editor.gui(&mut canvas);
    assert_eq!(
        editor.selection(),
        [NodeOwner::Port("t".into()), NodeOwner::Instance("y".into())]
    );
}

#[test]
fn save_and_reopen() -> Result<()> {
    let dir = tempdir()?;
    let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf8 temp path");
    let path = root.join("m2.nhdl");

    let mut editor = StructureEditor::new(Some(samples::m2()?));
    editor.save_as(&path)?;
    assert_eq!(editor.path(), Some(path.as_path()));
    assert!(!editor.is_dirty());

    let reopened = StructureEditor::open(&path)?;
    assert_eq!(reopened.structure(), editor.structure());
    assert_eq!(reopened.title(), "m2");

    let json_path = root.join("m2.json");
    StructureDoc::new(samples::m2()?).save(&json_path)?;
    let mut from_json = StructureEditor::open(&json_path)?;
    from_json.save()?;
    assert_eq!(StructureDoc::load(&json_path)?.structure, samples::m2()?);
    Ok(())
}

#[test]
fn relinking_a_shared_net_leaves_editor_clean() {
    let mut editor = StructureEditor::new(Some(samples::keeper(SignalType::Bit, 0).unwrap()));
    let mut canvas = RecordingCanvas::new();
    editor.gui(&mut canvas);
    let nets_before = editor.structure().unwrap().nets.clone();

    let map = editor.pass().id_map();
    let i = map.pin_of(&EndpointRef::port("i")).unwrap();
    let o = map.pin_of(&EndpointRef::port("o")).unwrap();
    canvas.script_link(i, o, true);
    let report = editor.gui(&mut canvas);
    assert!(report.connected.is_empty());
    assert_eq!(report.rejected, 1);
    assert!(!editor.is_dirty());
    assert_eq!(editor.structure().unwrap().nets, nets_before);
}

#[test]
fn free_document_path_skips_existing_files() -> Result<()> {
    let dir = tempdir()?;
    let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf8 temp path");
    assert_eq!(free_document_path(&root, "m1"), root.join("m1.json"));

    std::fs::write(root.join("m1.json"), "{}")?;
    std::fs::write(root.join("m1_2.json"), "{}")?;
    assert_eq!(free_document_path(&root, "m1"), root.join("m1_3.json"));
    Ok(())
}

#[test]
fn unsaved_editors_of_one_type_do_not_overwrite_each_other() -> Result<()> {
    let dir = tempdir()?;
    let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf8 temp path");

    let mut first = StructureEditor::new(Some(samples::m1()?));
    let mut second = StructureEditor::new(Some(Structure::named("m1")));

    let a = first.save_in(&root)?;
    let b = second.save_in(&root)?;
    assert_eq!(a, root.join("m1.json"));
    assert_eq!(b, root.join("m1_2.json"));
    assert_eq!(StructureDoc::load(&a)?.structure, samples::m1()?);
    assert!(StructureDoc::load(&b)?.structure.ports.is_empty());

    // Once saved, an editor keeps writing to its own file.
    assert_eq!(first.save_in(&root)?, a);
    Ok(())
}
