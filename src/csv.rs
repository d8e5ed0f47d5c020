use std::{
    fs::File,
    io::{self, BufWriter, Write},
    path::Path,
};

use crate::body::{Body, Origin};

/// Writes one row per body per tick:
/// `tick,id,x,y,vx,vy,mass,radius,origin`.
pub struct SnapshotWriter<W: Write> {
    out: W,
}

impl SnapshotWriter<BufWriter<File>> {
    pub fn create(path: impl AsRef<Path>) -> Result<Self, io::Error> {
        Self::new(BufWriter::new(File::create(path)?))
    }
}

impl<W: Write> SnapshotWriter<W> {
    pub fn new(mut out: W) -> Result<Self, io::Error> {
        writeln!(out, "tick,id,x,y,vx,vy,mass,radius,origin")?;
        Ok(Self { out })
    }

    pub fn write_tick(&mut self, tick: u64, bodies: &[Body]) -> Result<(), io::Error> {
        for body in bodies {
            let origin = match body.origin {
                Origin::Seeded => "seeded",
                Origin::Spawned => "spawned",
            };
            writeln!(
                self.out,
                "{tick},{},{},{},{},{},{},{},{origin}",
                body.id.0,
                body.position.x,
                body.position.y,
                body.velocity.x,
                body.velocity.y,
                body.mass,
                body.radius,
            )?;
        }
        Ok(())
    }

    pub fn finish(mut self) -> Result<W, io::Error> {
        self.out.flush()?;
        Ok(self.out)
    }
}

#[cfg(test)]
mod tests {
    use nalgebra::Vector2;

    use super::*;
    use crate::body::BodyId;

    #[test]
    fn writes_header_and_rows() {
        let body = Body::new(BodyId(3), Vector2::new(1.5, 2.), Vector2::new(-1., 0.), 10., 5.)
            .unwrap()
            .with_origin(Origin::Spawned);

        let mut writer = SnapshotWriter::new(Vec::new()).unwrap();
        writer.write_tick(7, &[body]).unwrap();
        let out = String::from_utf8(writer.finish().unwrap()).unwrap();

        assert_eq!(
            out,
            "tick,id,x,y,vx,vy,mass,radius,origin\n7,3,1.5,2,-1,0,10,5,spawned\n"
        );
    }
}
