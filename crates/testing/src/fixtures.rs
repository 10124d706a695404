//! Stub source fixtures shaped like the real editor stub corpus: documented
//! declarations, empty bodies, `= _` placeholder constants.

/// A trimmed-down `date.rb` stub: constants, singleton and instance
/// methods, aliases, a nested class, and a subclass.
pub const DATE_STUB: &str = "\
# Class representing a date.
#
#    Date.new(2001, 2, 3)
class Date
  include Comparable

  # The Julian day number of the day of calendar reform for Italy.
  ITALY = _
  # An array of strings of full month names in English.
  MONTHNAMES = _

  # Creates a date object denoting the present day.
  def self.today(sg = Date::ITALY) end

  # Returns the year.
  def year() end

  # Returns the month (1-12).
  def month() end
  alias mon month

  # Returns the day of the month (1-31).
  def mday() end
  alias day mday

  # Returns true if the date is Monday.
  def monday?() end

  # Compares two dates.
  def <=>(other) end

  # An object representing positive or negative infinity.
  class Infinity < Numeric
    def infinite?() end
  end
end

# Class representing a date and time.
class DateTime < Date
  # Returns the hour (0-23).
  def hour() end
end
";

/// The core exception hierarchy.
pub const EXCEPTIONS_STUB: &str = "\
# The root of the exception hierarchy.
class Exception
  # Returns the result of invoking exception.to_s.
  def message() end

  # Returns any backtrace associated with the exception.
  def backtrace() end
end

class StandardError < Exception; end
class ArgumentError < StandardError; end
class IOError < StandardError; end
class RuntimeError < StandardError; end
";

/// A nested slice of the OpenSSL stubs.
pub const OPENSSL_STUB: &str = "\
# OpenSSL provides SSL, TLS and general purpose cryptography.
module OpenSSL
  # The version of the OpenSSL library in use.
  OPENSSL_VERSION = _

  # Generic error raised by OpenSSL.
  class OpenSSLError < StandardError; end

  module PKey
    # Raised by asymmetric key operations.
    class PKeyError < OpenSSL::OpenSSLError; end

    # An RSA key pair.
    class RSA
      # Generates an RSA keypair.
      def self.generate(size, exponent = 65537) end

      # Encrypts data with the public key.
      def public_encrypt(data, padding = nil) end

      # Returns the private exponent.
      attr_accessor :d
    end
  end
end
";

/// A trimmed-down `symbol.rb` stub with operator names and markers.
pub const SYMBOL_STUB: &str = "\
# Symbol objects represent names inside the Ruby interpreter.
class Symbol
  include Comparable

  # Compares symbol with other in an ASCII-compatible way.
  def <=>(other) end

  # Returns the name or string corresponding to sym.
  def to_s() end
  alias id2name to_s

  # Returns a Proc object which responds to the symbol.
  def to_proc() end

  # Returns true if sym is empty.
  def empty?() end

  # In general, to_sym returns the Symbol corresponding to an object.
  def to_sym() end
end
";

/// The full fixture corpus as `(unit name, text)` pairs.
pub fn corpus() -> Vec<(&'static str, &'static str)> {
    vec![
        ("date.rb", DATE_STUB),
        ("exceptions.rb", EXCEPTIONS_STUB),
        ("openssl.rb", OPENSSL_STUB),
        ("symbol.rb", SYMBOL_STUB),
    ]
}
