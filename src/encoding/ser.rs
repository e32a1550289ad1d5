use super::*;

/// Values that can be written as an element through any [`BsonWriter`].
pub trait Ser {
    /// Writes `self` as the element `name` of the container `w` has open.
    ///
    /// # Errors
    ///
    /// Fails if `w` is not inside a container or if the value breaks the format, such
    /// as a name containing a null byte.
    fn ser<W: BsonWriter>(&self, name: &str, w: &mut W) -> Result<(), Error>;
}

impl<'a, T: Ser + ?Sized> Ser for &'a T {
    fn ser<W: BsonWriter>(&self, name: &str, w: &mut W) -> Result<(), Error> {
        (*self).ser(name, w)
    }
}

/// Writes the elements of `doc` into the container `w` has open.
pub(crate) fn ser_elements<W: BsonWriter>(doc: &Document, w: &mut W) -> Result<(), Error> {
    for (name, value) in doc {
        value.ser(name, w)?;
    }
    Ok(())
}

impl Ser for Document {
    fn ser<W: BsonWriter>(&self, name: &str, w: &mut W) -> Result<(), Error> {
        w.write_start_embedded_document(name)?;
        ser_elements(self, w)?;
        w.write_end_document()
    }
}

impl Ser for [Bson] {
    fn ser<W: BsonWriter>(&self, name: &str, w: &mut W) -> Result<(), Error> {
        w.write_start_array(name)?;
        for (i, value) in self.iter().enumerate() {
            value.ser(&i.to_string(), w)?;
        }
        w.write_end_array()
    }
}

impl Ser for JavaScriptWithScope {
    fn ser<W: BsonWriter>(&self, name: &str, w: &mut W) -> Result<(), Error> {
        w.write_start_javascript_with_scope(name, &self.code)?;
        w.write_start_document()?;
        ser_elements(&self.scope, w)?;
        // closes the code with scope value too
        w.write_end_document()
    }
}

impl Ser for Bson {
    fn ser<W: BsonWriter>(&self, name: &str, w: &mut W) -> Result<(), Error> {
        match self {
            Bson::Double(f) => w.write_double(name, *f),
            Bson::String(s) => w.write_string(name, s),
            Bson::Document(d) => d.ser(name, w),
            Bson::Array(a) => a[..].ser(name, w),
            Bson::Binary(b) => w.write_binary(name, b),
            Bson::ObjectId(oid) => w.write_object_id(name, *oid),
            Bson::Boolean(b) => w.write_boolean(name, *b),
            Bson::DateTime(d) => w.write_date_time(name, *d),
            Bson::Null => w.write_null(name),
            Bson::RegularExpression(re) => w.write_regular_expression(name, &re.pattern, &re.options),
            Bson::JavaScript(code) => w.write_javascript(name, code),
            Bson::Symbol(s) => w.write_symbol(name, s),
            Bson::JavaScriptWithScope(js) => js.ser(name, w),
            Bson::Int32(i) => w.write_int32(name, *i),
            Bson::Timestamp(t) => w.write_timestamp(name, *t),
            Bson::Int64(i) => w.write_int64(name, *i),
            Bson::MinKey => w.write_min_key(name),
            Bson::MaxKey => w.write_max_key(name),
        }
    }
}
