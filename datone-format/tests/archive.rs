use std::io;
use std::num::NonZeroU32;
use std::path::Path;

use datone_format::*;

fn p(s: &str) -> DatPath {
    DatPath::new(s).unwrap()
}

const FILES: &[(&str, &[u8])] = &[
    ("readme.txt", b"read me"),
    ("level-ai.lvl", b"ai variant"),
    ("level.lvl", b"level"),
    ("a_b.txt", b"underscore"),
    ("chars/hero.ghg", b"hero model"),
    ("chars/ai/hero.ai", b"hero script"),
    ("chars/villain.ghg", b""),
    ("chars/minikit/a.ghg", b"minikit"),
    ("chars/minikit/deep/b.ghg", b"deeper"),
    ("levels/one/map.ter", b"terrain one"),
    ("levels/two/a.ter", b"terrain two"),
    ("levels/two/map.ter", b"terrain two map"),
    ("levels/two/ai/script.txt", b"script"),
    ("ai/global.txt", b"global ai"),
    ("tmp/scratch.bin", &[0, 1, 2, 3]),
];

fn write_tree(root: &Path, files: &[(&str, &[u8])]) {
    for (path, bytes) in files {
        let path = root.join(path);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, bytes).unwrap();
    }
}

fn build(dir: &Path, options: ArchiveOptions) -> std::path::PathBuf {
    let source = dir.join("source");
    write_tree(&source, FILES);
    let dat = dir.join("test.dat");
    let stats = Archive::create(&dat, options).build(&source).unwrap();
    assert_eq!(stats.files, FILES.len());
    dat
}

fn assert_contents(archive: &Archive, files: &[(&str, &[u8])]) {
    assert_eq!(archive.root().files().len(), files.len());
    for (path, bytes) in files {
        assert_eq!(&archive.read_file(&p(path)).unwrap(), bytes, "{}", path);
    }
}

#[test]
fn round_trip_every_game() {
    for game in [Game::Lsw1, Game::Lsw2, Game::Tcs] {
        let dir = tempfile::tempdir().unwrap();
        let options = ArchiveOptions::default().with_game(game);
        let dat = build(dir.path(), options.clone());

        let archive = Archive::open(&dat, options).unwrap();
        assert_contents(&archive, FILES);
    }
}

#[test]
fn files_beside_buzzword_directory_stay_put() {
    let files: &[(&str, &[u8])] = &[
        ("chars/hero.ghg", b"hero model"),
        ("chars/ai/hero.ai", b"hero script"),
    ];

    for game in [Game::Lsw1, Game::Lsw2, Game::Tcs] {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("source");
        write_tree(&source, files);
        let dat = dir.path().join("chars.dat");
        let options = ArchiveOptions::default().with_game(game);
        Archive::create(&dat, options.clone())
            .build(&source)
            .unwrap();

        let archive = Archive::open(&dat, options).unwrap();
        let paths = archive
            .root()
            .files()
            .into_iter()
            .map(|(path, _)| path.as_str().to_string())
            .collect::<Vec<_>>();
        assert_eq!(paths, vec!["chars/hero.ghg", "chars/ai/hero.ai"], "{}", game);
        assert!(archive.lookup(&p("hero.ghg")).is_none());
        assert_contents(&archive, files);
    }
}

#[test]
fn round_trip_big_endian() {
    let dir = tempfile::tempdir().unwrap();
    let options = ArchiveOptions::default().with_endianness(Endianness::Big);
    let dat = build(dir.path(), options.clone());

    let archive = Archive::open(&dat, options).unwrap();
    assert_contents(&archive, FILES);

    // Reading with the wrong byte order lands the table pointer elsewhere.
    assert!(Archive::open(&dat, ArchiveOptions::default()).is_err());
}

#[test]
fn byte_layout() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("source");
    write_tree(&source, &[("a.txt", &b"hello"[..])]);
    let dat = dir.path().join("one.dat");
    Archive::create(&dat, ArchiveOptions::default())
        .build(&source)
        .unwrap();

    let mut expected = vec![13, 0, 0, 0, 55, 0, 0, 0];
    expected.extend_from_slice(b"hello");
    expected.extend_from_slice(&[0xff; 4]);
    expected.extend_from_slice(&[1, 0, 0, 0]);
    expected.extend_from_slice(&[8, 0, 0, 0, 5, 0, 0, 0, 5, 0, 0, 0, 0, 0, 0, 0]);
    expected.extend_from_slice(&[2, 0, 0, 0]);
    expected.extend_from_slice(&[1, 0, 0, 0, 0, 0, 0, 0]);
    expected.extend_from_slice(&[0, 0, 0, 0, 1, 0, 0, 0]);
    expected.extend_from_slice(&[11, 0, 0, 0]);
    expected.extend_from_slice(b"\0a.txt\0");
    expected.extend_from_slice(b"IAN.S\0");

    assert_eq!(std::fs::read(&dat).unwrap(), expected);
}

#[test]
fn alignment_2048() {
    let dir = tempfile::tempdir().unwrap();
    let alignment = NonZeroU32::new(2048).unwrap();
    let dat = build(dir.path(), ArchiveOptions::default().with_alignment(alignment));

    let archive = Archive::open(&dat, ArchiveOptions::default()).unwrap();
    for (path, file) in archive.root().files() {
        match file.payload() {
            Payload::Archive { offset, .. } => assert_eq!(offset % 2048, 0, "{}", path),
            other => panic!("{} is bound to {:?}", path, other),
        }
    }
    assert_eq!(archive.inferred_alignment(), alignment);
    assert_contents(&archive, FILES);
}

#[test]
fn header_layout_is_inferred_and_kept() {
    let dir = tempfile::tempdir().unwrap();
    let dat = build(dir.path(), ArchiveOptions::default());
    let archive = Archive::open(&dat, ArchiveOptions::default()).unwrap();
    assert_eq!(archive.options().header_layout, HeaderLayout::NamesEnd);

    let dir = tempfile::tempdir().unwrap();
    let layout = HeaderLayout::SigningKey(0xdead_beef);
    let dat = build(
        dir.path(),
        ArchiveOptions::default().with_header_layout(layout),
    );
    let bytes = std::fs::read(&dat).unwrap();
    assert_eq!(bytes[4..8], 0xdead_beefu32.to_le_bytes());

    let mut archive = Archive::open(&dat, ArchiveOptions::default()).unwrap();
    assert_eq!(archive.options().header_layout, layout);
    archive.rebuild().unwrap();
    assert_eq!(std::fs::read(&dat).unwrap()[4..8], 0xdead_beefu32.to_le_bytes());
}

#[test]
fn empty_archive() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("empty");
    std::fs::create_dir_all(&source).unwrap();
    let dat = dir.path().join("empty.dat");
    Archive::create(&dat, ArchiveOptions::default())
        .build(&source)
        .unwrap();

    let archive = Archive::open(&dat, ArchiveOptions::default()).unwrap();
    assert!(archive.root().is_empty());
}

#[test]
fn bad_signature() {
    let dir = tempfile::tempdir().unwrap();
    let dat = build(dir.path(), ArchiveOptions::default());
    let mut bytes = std::fs::read(&dat).unwrap();
    let len = bytes.len();
    bytes[len - 6..].copy_from_slice(b"NOPE!\0");
    std::fs::write(&dat, bytes).unwrap();

    match Archive::open(&dat, ArchiveOptions::default()) {
        Err(Error::Format(FormatError::Signature { found })) => assert_eq!(found, b"NOPE!"),
        other => panic!("unexpected {:?}", other.map(|_| ())),
    }
}

#[test]
fn truncated_archive() {
    let dir = tempfile::tempdir().unwrap();
    let dat = dir.path().join("short.dat");
    std::fs::write(&dat, [1, 2, 3]).unwrap();
    assert!(matches!(
        Archive::open(&dat, ArchiveOptions::default()),
        Err(Error::Format(FormatError::Truncated { .. }))
    ));
}

#[test]
fn corrupt_root_terminator() {
    let dir = tempfile::tempdir().unwrap();
    let dat = build(dir.path(), ArchiveOptions::default());
    let mut bytes = std::fs::read(&dat).unwrap();

    let table = u32::from_le_bytes(bytes[0..4].try_into().unwrap()) as usize;
    let blobs = u32::from_le_bytes(bytes[table + 4..table + 8].try_into().unwrap()) as usize;
    let root = table + 8 + blobs * 16 + 4;
    bytes[root..root + 2].copy_from_slice(&i16::MAX.to_le_bytes());
    std::fs::write(&dat, bytes).unwrap();

    assert!(matches!(
        Archive::open(&dat, ArchiveOptions::default()),
        Err(Error::Structural(StructuralError::EntryOutOfBounds { .. }))
    ));
}

#[test]
fn patch_keeps_alignment() {
    let dir = tempfile::tempdir().unwrap();
    let alignment = NonZeroU32::new(2048).unwrap();
    let dat = build(dir.path(), ArchiveOptions::default().with_alignment(alignment));

    let patch = dir.path().join("patch");
    write_tree(
        &patch,
        &[
            ("chars/hero.ghg", &b"new hero"[..]),
            ("chars/sidekick.ghg", &b"added"[..]),
        ],
    );

    let output = dir.path().join("patched.dat");
    let mut archive = Archive::open(&dat, ArchiveOptions::default()).unwrap();
    archive.patch(&patch, Some(&output)).unwrap();
    assert_eq!(archive.path(), output);

    let patched = Archive::open(&output, ArchiveOptions::default()).unwrap();
    assert_eq!(patched.inferred_alignment(), alignment);
    assert_eq!(patched.read_file(&p("chars/hero.ghg")).unwrap(), b"new hero");
    assert_eq!(patched.read_file(&p("chars/sidekick.ghg")).unwrap(), b"added");
    assert_eq!(patched.read_file(&p("level.lvl")).unwrap(), b"level");
    assert_eq!(patched.root().files().len(), FILES.len() + 1);

    // The original is untouched.
    let original = Archive::open(&dat, ArchiveOptions::default()).unwrap();
    assert_eq!(original.read_file(&p("chars/hero.ghg")).unwrap(), b"hero model");
}

#[test]
fn patch_in_place() {
    let dir = tempfile::tempdir().unwrap();
    let dat = build(dir.path(), ArchiveOptions::default());
    let patch = dir.path().join("patch");
    write_tree(&patch, &[("readme.txt", &b"patched"[..])]);

    let mut archive = Archive::open(&dat, ArchiveOptions::default()).unwrap();
    archive.patch(&patch, None).unwrap();
    assert_eq!(archive.read_file(&p("readme.txt")).unwrap(), b"patched");

    let reopened = Archive::open(&dat, ArchiveOptions::default()).unwrap();
    assert_eq!(reopened.read_file(&p("readme.txt")).unwrap(), b"patched");
    assert_eq!(reopened.read_file(&p("ai/global.txt")).unwrap(), b"global ai");
}

fn rnc_payload(unpacked: u32) -> Vec<u8> {
    let mut buf = b"RNC\x01".to_vec();
    buf.extend_from_slice(&unpacked.to_be_bytes());
    buf.extend_from_slice(&4u32.to_be_bytes());
    buf.extend_from_slice(b"pack");
    buf
}

#[test]
fn compressed_payloads() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("source");
    let packed = rnc_payload(100);
    write_tree(
        &source,
        &[("packed.bin", packed.as_slice()), ("plain.txt", &b"plain"[..])],
    );
    let dat = dir.path().join("rnc.dat");
    Archive::create(&dat, ArchiveOptions::default())
        .build(&source)
        .unwrap();

    let archive = Archive::open(&dat, ArchiveOptions::default()).unwrap();
    let file = archive.lookup(&p("packed.bin")).unwrap().as_file().unwrap();
    let info = file.info().unwrap();
    assert!(info.compressed);
    assert_eq!(info.actual_size, packed.len() as u32);
    assert_eq!(info.uncompressed_size, 100);
    assert!(!archive
        .lookup(&p("plain.txt"))
        .unwrap()
        .as_file()
        .unwrap()
        .info()
        .unwrap()
        .compressed);

    // Raw copy.
    let raw = dir.path().join("raw");
    let stats = archive.extract(&raw, false).unwrap();
    assert_eq!(stats.files, 2);
    assert_eq!(stats.decompressed, 0);
    assert_eq!(std::fs::read(raw.join("packed.bin")).unwrap(), packed);

    // No decompressor configured.
    assert!(matches!(
        archive.extract(dir.path().join("fail"), true),
        Err(Error::NoDecompressor { .. })
    ));

    // Stub decompressor.
    let unpack = |packed: &Path, dest: &Path| -> io::Result<()> {
        let bytes = std::fs::read(packed)?;
        assert!(bytes.starts_with(b"RNC"));
        std::fs::write(dest, b"unpacked")
    };
    let out = dir.path().join("out");
    let stats = archive.extract_with(&out, Some(&unpack)).unwrap();
    assert_eq!(stats.decompressed, 1);
    assert_eq!(std::fs::read(out.join("packed.bin")).unwrap(), b"unpacked");
    assert_eq!(std::fs::read(out.join("plain.txt")).unwrap(), b"plain");

    // Failing decompressor.
    let broken =
        |_: &Path, _: &Path| -> io::Result<()> { Err(io::Error::new(io::ErrorKind::Other, "boom")) };
    assert!(matches!(
        archive.extract_with(dir.path().join("broken"), Some(&broken)),
        Err(Error::Decompress { .. })
    ));
}

#[test]
fn stage_then_rebuild() {
    let dir = tempfile::tempdir().unwrap();
    let dat = build(dir.path(), ArchiveOptions::default());
    let staging = dir.path().join("staging");

    let mut archive = Archive::open(
        &dat,
        ArchiveOptions::default().with_staging_dir(&staging),
    )
    .unwrap();

    let staged = archive.stage(&p("chars/hero.ghg")).unwrap();
    assert!(staged.starts_with(&staging));
    std::fs::write(&staged, b"edited in place").unwrap();

    archive
        .insert(&p("new/placeholder.txt"), NodeKind::File)
        .unwrap();
    archive.remove(&p("tmp"), true).unwrap();
    archive
        .rename(&p("readme.txt"), &p("chars/readme.txt"), false)
        .unwrap();

    archive.rebuild().unwrap();
    assert!(!staged.exists());

    let reopened = Archive::open(&dat, ArchiveOptions::default()).unwrap();
    assert_eq!(
        reopened.read_file(&p("chars/hero.ghg")).unwrap(),
        b"edited in place"
    );
    assert_eq!(reopened.read_file(&p("new/placeholder.txt")).unwrap(), b"");
    assert_eq!(reopened.read_file(&p("chars/readme.txt")).unwrap(), b"read me");
    assert!(reopened.lookup(&p("tmp")).is_none());
    assert!(reopened.lookup(&p("readme.txt")).is_none());
}
