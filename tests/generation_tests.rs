//! Library-level generation tests over on-disk fixtures.

use std::fs;
use std::rc::Rc;

use camino::Utf8PathBuf;
use kanna::blueprint;
use kanna::context::GenerationContext;
use kanna::fsys::HostFs;
use kanna::ir::{Normalizer, Project, flatten};
use kanna::ninja_gen;
use rstest::rstest;

struct Fixture {
    _guard: tempfile::TempDir,
    root: Utf8PathBuf,
}

impl Fixture {
    fn new(blueprint: &str, files: &[&str]) -> Self {
        let guard = tempfile::tempdir().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(guard.path().to_path_buf()).expect("utf8 tempdir");
        for file in files {
            let path = root.join(file);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).expect("mkdir");
            }
            fs::write(&path, "").expect("write source");
        }
        fs::write(root.join("kanna.yml"), blueprint).expect("write blueprint");
        Self {
            _guard: guard,
            root,
        }
    }

    fn context(&self) -> GenerationContext {
        GenerationContext {
            cwd: Utf8PathBuf::from("/work"),
            blueprint_dir: self.root.clone(),
            ..GenerationContext::default()
        }
    }

    fn roots(&self, ctx: &GenerationContext) -> Vec<Rc<Project>> {
        let doc = blueprint::load_document(&self.root.join("kanna.yml")).expect("load");
        let records = blueprint::project_records(&doc, ctx).expect("records");
        Normalizer::new(ctx, &HostFs)
            .normalize_roots(&records)
            .expect("normalize")
    }

    fn ninja(&self) -> String {
        let ctx = self.context();
        let worklist = flatten(&self.roots(&ctx));
        ninja_gen::generate(&worklist, &ctx).expect("generate")
    }
}

#[rstest]
fn executable_end_to_end() {
    let fixture = Fixture::new(
        concat!(
            "projects:\n",
            "  - name: app\n",
            "    type: executable\n",
            "    sources: [\"src/*.cpp\"]\n",
        ),
        &["src/main.cpp", "src/util.cpp"],
    );
    let ninja = fixture.ninja();

    // One compile edge per resolved source.
    assert_eq!(ninja.matches(": cxx ").count(), 2);
    assert!(ninja.contains(&format!(
        "build obj/app/main.o: cxx /work/{}/src/main.cpp\n",
        fixture.root
    )));
    assert!(ninja.contains(&format!(
        "build obj/app/util.o: cxx /work/{}/src/util.cpp\n",
        fixture.root
    )));
    assert!(ninja.contains("build bin/app: link obj/app/main.o obj/app/util.o\n"));
    assert!(ninja.contains("build app: phony bin/app\n"));
    assert!(ninja.ends_with("default app\n"));
}

#[rstest]
fn recursive_glob_matches_suffix_transitively() {
    let fixture = Fixture::new(
        concat!(
            "projects:\n",
            "  - name: app\n",
            "    type: executable\n",
            "    sources: [\"src/**.cpp\"]\n",
        ),
        &["src/a.cpp", "src/sub/b.cpp", "src/b.txt"],
    );
    let ninja = fixture.ninja();

    assert_eq!(ninja.matches(": cxx ").count(), 2);
    assert!(ninja.contains("build obj/app/a.o:"));
    assert!(ninja.contains("build obj/app/sub/b.o:"));
    assert!(!ninja.contains("b.txt"));
}

#[rstest]
fn shared_dependency_is_emitted_once_across_roots() {
    let fixture = Fixture::new(
        concat!(
            "projects:\n",
            "  - name: first\n",
            "    type: executable\n",
            "    dependencies:\n",
            "      - name: core\n",
            "        type: static_library\n",
            "        sources: [\"core/*.cpp\"]\n",
            "  - name: second\n",
            "    type: executable\n",
            "    dependencies:\n",
            "      - name: core\n",
            "        type: static_library\n",
            "        sources: [\"core/*.cpp\"]\n",
        ),
        &["core/core.cpp"],
    );
    let ninja = fixture.ninja();

    assert_eq!(ninja.matches("build lib/core.a: lib").count(), 1);
    assert_eq!(ninja.matches("build obj/core/core.o: cxx").count(), 1);
    assert!(ninja.ends_with("default first second\n"));
}

#[rstest]
fn prebuilt_dependency_becomes_link_flags() {
    let fixture = Fixture::new(
        concat!(
            "projects:\n",
            "  - name: app\n",
            "    type: executable\n",
            "    dependencies:\n",
            "      - name: m\n",
            "        type: prebuilt\n",
            "        static_libraries: [m]\n",
            "        static_library_directories: [\"lib/\"]\n",
        ),
        &[],
    );
    let ninja = fixture.ninja();

    assert!(ninja.contains("    lflags = -L\"lib/\" -lm\n"));
    // The prebuilt node itself is gone: no phony alias, no edges.
    assert!(!ninja.contains("build m: phony"));
    assert!(ninja.contains("build bin/app: link\n"));
}

#[rstest]
fn pre_build_chain_gates_compilation() {
    let fixture = Fixture::new(
        concat!(
            "projects:\n",
            "  - name: app\n",
            "    type: executable\n",
            "    sources: [\"src/*.cpp\"]\n",
            "    pre_build_commands:\n",
            "      - input: table.txt\n",
            "        output: gen.txt\n",
            "        cmd: gen ${in} ${out}\n",
        ),
        &["src/main.cpp"],
    );
    let ninja = fixture.ninja();
    let gen_out = fixture.root.join("gen.txt");

    assert!(ninja.contains(&format!("|| ../{gen_out}\n")));
    assert!(ninja.contains(&format!(
        "    cmd = gen {} {gen_out}\n",
        fixture.root.join("table.txt")
    )));
}

#[rstest]
fn generation_is_idempotent() {
    let fixture = Fixture::new(
        concat!(
            "projects:\n",
            "  - name: app\n",
            "    type: executable\n",
            "    sources: [\"src/**.cpp\"]\n",
        ),
        &["src/main.cpp", "src/sub/util.cpp"],
    );
    assert_eq!(fixture.ninja(), fixture.ninja());
}

#[rstest]
fn active_configuration_changes_generated_flags() {
    let blueprint = concat!(
        "configurations: [debug, release]\n",
        "projects:\n",
        "  - name: app\n",
        "    type: executable\n",
        "    sources: [\"src/*.cpp\"]\n",
        "    debug:\n",
        "      compile_options: [\"-g\"]\n",
        "    release:\n",
        "      compile_options: [\"-O2\"]\n",
    );
    let fixture = Fixture::new(blueprint, &["src/main.cpp"]);

    let doc = blueprint::load_document(&fixture.root.join("kanna.yml")).expect("load");
    let configurations = blueprint::declared_configurations(&doc).expect("configs");
    assert_eq!(configurations, vec!["debug".to_owned(), "release".to_owned()]);

    for (active, expected) in [("debug", "    cxxflags = -g\n"), ("release", "    cxxflags = -O2\n")]
    {
        let ctx = GenerationContext {
            configurations: configurations.clone(),
            active_configuration: Some(active.to_owned()),
            ..fixture.context()
        };
        let records = blueprint::project_records(&doc, &ctx).expect("records");
        let roots = Normalizer::new(&ctx, &HostFs)
            .normalize_roots(&records)
            .expect("normalize");
        let ninja = ninja_gen::generate(&flatten(&roots), &ctx).expect("generate");
        assert!(ninja.contains(expected), "{active}: missing flags in\n{ninja}");
    }
}
